//! Per-row outcome logic: maps a record's supervisor approval to the action
//! to take and the status to persist.
//!
//! Pure planning — the workflow dispatches the returned action through the
//! host capabilities, so the whole decision table is testable offline.

use chrono::{Duration, NaiveDate};

use crate::error::WorkflowError;
use crate::host::AllDayEvent;
use crate::record::{Columns, Record};
use crate::schema::{ApprovalState, EventStatus};

/// Run-wide inputs to the planner: deployment identifiers plus the local
/// execution date stamped into event descriptions.
#[derive(Debug, Clone)]
pub struct ProcessContext {
    pub ooo_calendar_id: String,
    pub rejection_contact: String,
    pub today: NaiveDate,
}

/// Rejection notification addressed to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Side effect chosen for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SendRejection(Rejection),
    CreateEvent {
        /// The submitter's email doubles as their primary calendar id.
        calendar_id: String,
        event: AllDayEvent,
    },
    Skip,
}

/// A resolved record: the action to dispatch and the status to write back.
#[derive(Debug, Clone)]
pub struct Plan {
    pub action: Action,
    pub status: EventStatus,
}

/// Resolve one record against the approval decision table.
///
/// First match wins: "Not approved" sends the rejection email, "Approved"
/// creates the all-day event, anything else does nothing and leaves the row
/// eligible for the next run.
///
/// Note that rejected rows are marked "Event created" too — the status
/// records that the row was handled, so a request resubmitted with a
/// corrected approval is never revisited. Long-standing behavior, kept as is;
/// fixing it properly means a separate "notified" status.
pub fn plan(record: &Record, cols: &Columns, ctx: &ProcessContext) -> Result<Plan, WorkflowError> {
    let email = record.cell(cols.email_address);
    let name = record.cell(cols.full_name);
    let supervisor = record.cell(cols.supervisor_email);
    let reason = record.cell(cols.reason);
    let description = record.cell(cols.description);
    let approval_cell = record.cell(cols.supervisor_approval);
    let hr_approval = record.cell(cols.hr_approval);

    let plan = match record.approval(cols) {
        ApprovalState::NotApproved => {
            let start = record.start_date(cols)?;
            let end = record.end_date(cols)?;
            let subject = format!(
                "Your vacation time request failed, contact {}",
                ctx.rejection_contact
            );
            // The body reports the HR approval cell verbatim; HR approval is
            // informational and never branched on.
            let body = format!(
                "Your {} request was {} for {} to {}\n\n{}",
                reason,
                hr_approval,
                to_date_string(start),
                to_date_string(end),
                description
            );
            Plan {
                action: Action::SendRejection(Rejection {
                    to: email.to_string(),
                    subject,
                    body,
                }),
                status: EventStatus::Created,
            }
        }

        ApprovalState::Approved => {
            let start = record.start_date(cols)?;
            let end = record.end_date(cols)?;
            let event = AllDayEvent {
                title: format!("{} - {}", name, reason),
                // The all-day API treats the end date as exclusive; both
                // bounds are shifted forward so the event visually covers the
                // inclusive range the submitter picked.
                start: start + Duration::days(1),
                end: end + Duration::days(2),
                description: format!(
                    "{} by {} on {}\n\n{}",
                    approval_cell,
                    supervisor,
                    approval_stamp(ctx.today),
                    description
                ),
                guests: vec![ctx.ooo_calendar_id.clone()],
                send_invites: true,
            };
            Plan {
                action: Action::CreateEvent {
                    calendar_id: email.to_string(),
                    event,
                },
                status: EventStatus::Created,
            }
        }

        ApprovalState::Unset => Plan {
            action: Action::Skip,
            status: EventStatus::NotCreated,
        },
    };

    Ok(plan)
}

/// Execution-date stamp inside event descriptions: `6-15-2024`, month first,
/// no zero padding.
fn approval_stamp(date: NaiveDate) -> String {
    use chrono::Datelike;
    format!("{}-{}-{}", date.month(), date.day(), date.year())
}

/// `Mon Jun 10 2024` — the date shape the notification emails have always
/// used.
fn to_date_string(date: NaiveDate) -> String {
    date.format("%a %b %d %Y").to_string()
}
