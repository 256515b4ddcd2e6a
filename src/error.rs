//! Error types for the request workflow.
//!
//! Schema and config problems are fatal before any row is touched; a Google
//! API failure mid-batch aborts the remaining rows, leaving them unmarked and
//! eligible for the next run.

use thiserror::Error;

use crate::google_api::GoogleApiError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// A required column is missing; the full observed header row is included
    /// so the mismatch can be diagnosed from the error alone.
    #[error("header {header:?} not found in sheet: {headers:?}")]
    MissingHeader {
        header: &'static str,
        headers: Vec<String>,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("could not parse {field} {value:?} as a date")]
    DateParse {
        field: &'static str,
        value: String,
    },

    /// A form is already provisioned for this sheet. Recreating it would
    /// orphan the existing responses, so the user has to unlink first.
    #[error(
        "a form is already provisioned (form id {0}); unlink it from the sheet \
         (Form > Unlink form) and clear formId from the config to recreate"
    )]
    FormExists(String),

    #[error(transparent)]
    Google(#[from] GoogleApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_header_message_lists_sheet_headers() {
        let err = WorkflowError::MissingHeader {
            header: "HR approval",
            headers: vec!["Timestamp".to_string(), "Name".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("\"HR approval\""));
        assert!(msg.contains("Timestamp"));
        assert!(msg.contains("Name"));
    }
}
