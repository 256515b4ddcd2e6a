//! One-time provisioning: the intake form and the approval columns.
//!
//! `setup_form` builds the request form through the Forms API; the two
//! settings that API has no surface for (linking responses to the tracking
//! spreadsheet, collecting responder emails) are reported back as manual
//! steps. `setup_columns` appends the HR approval and status columns to the
//! response sheet with their dropdown rules.

use crate::config::{self, Config};
use crate::error::WorkflowError;
use crate::google_api::forms::{self, CreatedForm, QuestionSpec};
use crate::google_api::{get_valid_access_token, sheets};
use crate::schema::{ApprovalState, Campus, EventStatus, Header, Reason, FORM_TITLE, NAME_GUIDANCE};

/// Form settings the Forms API cannot change, printed after `setup_form`.
pub const MANUAL_FORM_STEPS: [&str; 2] = [
    "Open the form editor, then Responses > Link to Sheets, and select the tracking spreadsheet.",
    "Open Settings > Responses and set \"Collect email addresses\" to Verified.",
];

// ============================================================================
// Form setup
// ============================================================================

/// Create the intake form and record its id in the config.
///
/// Refuses to run when the config already holds a form id; unlink the old
/// form first so responses never split across two forms.
pub async fn setup_form(config: &mut Config) -> Result<CreatedForm, WorkflowError> {
    if let Some(form_id) = &config.form_id {
        return Err(WorkflowError::FormExists(form_id.clone()));
    }

    let token = get_valid_access_token().await?;
    let created = forms::create_form(&token, FORM_TITLE).await?;
    forms::add_questions(&token, &created.form_id, &intake_questions()).await?;

    config.form_id = Some(created.form_id.clone());
    config::save_config(config)?;

    log::info!("created intake form {}", created.form_id);
    Ok(created)
}

/// The intake questions in form order, which is also the column order the
/// linked sheet lays out (after its automatic Timestamp and Email Address
/// columns).
pub fn intake_questions() -> Vec<QuestionSpec> {
    let campuses: Vec<&str> = Campus::ALL.iter().map(|c| c.as_str()).collect();
    let reasons: Vec<&str> = Reason::ALL.iter().map(|r| r.as_str()).collect();

    vec![
        QuestionSpec::text(Header::FullName.title(), true).with_description(NAME_GUIDANCE),
        QuestionSpec::dropdown(Header::Campus.title(), &campuses, false),
        QuestionSpec::date(Header::StartDate.title(), true),
        QuestionSpec::date(Header::EndDate.title(), true),
        QuestionSpec::dropdown(Header::Reason.title(), &reasons, true),
        QuestionSpec::text(Header::Description.title(), false),
        QuestionSpec::text(Header::SupervisorEmail.title(), true),
        // Single-choice checkbox: an explicit attestation, not a yes/no pair.
        QuestionSpec::checkbox(Header::SupervisorApproval.title(), &["Approved"], true),
    ]
}

// ============================================================================
// Column setup
// ============================================================================

/// Where `setup_columns` placed one appended column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlacement {
    pub header: &'static str,
    /// A1 column letter, for the confirmation message.
    pub letter: String,
}

/// Append the HR approval and event status columns after the sheet's last
/// populated header, each with its dropdown rule over the data rows.
///
/// The append is unconditional; running this twice adds a second pair.
pub async fn setup_columns(config: &Config) -> Result<Vec<ColumnPlacement>, WorkflowError> {
    let token = get_valid_access_token().await?;
    let props =
        sheets::get_sheet_properties(&token, &config.spreadsheet_id, &config.sheet_name).await?;

    // Trailing empty cells are trimmed from the response, so the header row's
    // length is the last column with content.
    let header_range = sheets::row_range(&config.sheet_name, 1, props.column_count.max(1));
    let header_rows = sheets::get_values(&token, &config.spreadsheet_id, &header_range).await?;
    let width = header_rows.first().map(|row| row.len()).unwrap_or(0);

    let columns: [(&'static str, &[&str]); 2] = [
        (Header::HrApproval.title(), &ApprovalState::CHOICES),
        (Header::EventStatus.title(), &EventStatus::CHOICES),
    ];

    // Linked response sheets carry no spare columns, so grow the grid first.
    let needed = width + columns.len();
    if needed > props.column_count {
        sheets::append_columns(
            &token,
            &config.spreadsheet_id,
            props.sheet_id,
            needed - props.column_count,
        )
        .await?;
    }

    let mut placements = Vec::with_capacity(columns.len());
    for (offset, (header, choices)) in columns.into_iter().enumerate() {
        let column_index = width + offset;
        let cell = sheets::cell_ref(&config.sheet_name, column_index, 0);
        sheets::update_values(
            &token,
            &config.spreadsheet_id,
            &cell,
            vec![vec![header.to_string()]],
        )
        .await?;
        sheets::set_column_validation(
            &token,
            &config.spreadsheet_id,
            props.sheet_id,
            column_index,
            props.frozen_rows,
            choices,
        )
        .await?;

        log::info!("appended column {:?} at {}", header, cell);
        placements.push(ColumnPlacement {
            header,
            letter: sheets::column_letter(column_index),
        });
    }

    Ok(placements)
}
