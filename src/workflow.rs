//! The create/notify batch: one pass over the tracking sheet.
//!
//! Per run: snapshot the data region, validate the header schema (abort on
//! mismatch before touching any row), materialize records, keep those not
//! yet marked created, then process each in row order — dispatch its action
//! and persist the row before moving to the next. A dispatch failure leaves
//! that row unmarked and later rows untouched, so the next run picks both up.

use crate::error::WorkflowError;
use crate::host::{Calendar, Mailer, SheetRows};
use crate::process::{plan, Action, ProcessContext};
use crate::record::{Columns, Record};
use crate::schema::EventStatus;

/// Counts reported after a run, for the log line and the exit message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Data rows in the snapshot.
    pub rows_seen: usize,
    /// Rows that were not yet marked created and got written back.
    pub rows_processed: usize,
    pub emails_sent: usize,
    pub events_created: usize,
}

/// Run the batch against the given hosts.
pub async fn run_batch(
    sheet: &dyn SheetRows,
    mailer: &dyn Mailer,
    calendar: &dyn Calendar,
    ctx: &ProcessContext,
) -> Result<RunSummary, WorkflowError> {
    let snapshot = sheet.snapshot().await?;
    let cols = Columns::resolve(&snapshot.headers)?;

    let mut summary = RunSummary {
        rows_seen: snapshot.rows.len(),
        ..RunSummary::default()
    };

    let pending: Vec<Record> = snapshot
        .rows
        .into_iter()
        .enumerate()
        .map(|(index, values)| Record::from_row(index, values))
        .filter(|record| record.event_status(&cols) != EventStatus::Created)
        .collect();

    log::info!(
        "batch start: {} rows, {} pending",
        summary.rows_seen,
        pending.len()
    );

    for mut record in pending {
        let planned = plan(&record, &cols, ctx)?;

        match &planned.action {
            Action::SendRejection(mail) => {
                mailer.send(&mail.to, &mail.subject, &mail.body).await?;
                summary.emails_sent += 1;
                log::info!("row {}: not approved, email sent", record.row_number);
            }
            Action::CreateEvent { calendar_id, event } => {
                calendar.create_all_day_event(calendar_id, event).await?;
                summary.events_created += 1;
                log::info!("row {}: approved, calendar event created", record.row_number);
            }
            Action::Skip => {
                log::info!("row {}: no action taken", record.row_number);
            }
        }

        record.set_event_status(&cols, planned.status);
        sheet
            .write_row(snapshot.frozen_rows + record.row_number, record.row())
            .await?;
        summary.rows_processed += 1;
    }

    Ok(summary)
}
