//! Row model: turns the sheet's header row + a raw value row into a keyed
//! record, and reconstructs the flat row for write-back.
//!
//! A record keeps the entire raw row (including any columns outside the
//! schema) so write-back preserves every cell verbatim; the status column is
//! the only cell the workflow ever rewrites.

use chrono::NaiveDate;

use crate::error::WorkflowError;
use crate::schema::{ApprovalState, EventStatus, Header};

/// Resolved position of every schema column within the observed header row.
///
/// Resolution doubles as the fail-fast schema check: the first schema header
/// missing from the sheet aborts the run before any row is materialized.
#[derive(Debug, Clone)]
pub struct Columns {
    pub timestamp: usize,
    pub full_name: usize,
    pub email_address: usize,
    pub campus: usize,
    pub start_date: usize,
    pub end_date: usize,
    pub reason: usize,
    pub description: usize,
    pub supervisor_email: usize,
    pub supervisor_approval: usize,
    pub hr_approval: usize,
    pub event_status: usize,
}

impl Columns {
    pub fn resolve(headers: &[String]) -> Result<Columns, WorkflowError> {
        let find = |header: Header| -> Result<usize, WorkflowError> {
            headers
                .iter()
                .position(|h| h == header.title())
                .ok_or_else(|| WorkflowError::MissingHeader {
                    header: header.title(),
                    headers: headers.to_vec(),
                })
        };

        Ok(Columns {
            timestamp: find(Header::Timestamp)?,
            full_name: find(Header::FullName)?,
            email_address: find(Header::EmailAddress)?,
            campus: find(Header::Campus)?,
            start_date: find(Header::StartDate)?,
            end_date: find(Header::EndDate)?,
            reason: find(Header::Reason)?,
            description: find(Header::Description)?,
            supervisor_email: find(Header::SupervisorEmail)?,
            supervisor_approval: find(Header::SupervisorApproval)?,
            hr_approval: find(Header::HrApproval)?,
            event_status: find(Header::EventStatus)?,
        })
    }
}

/// One submitted request row, tagged with its 1-based position in the data
/// region. Values are kept in header order; the caller guarantees the row was
/// padded to header width before materialization.
#[derive(Debug, Clone)]
pub struct Record {
    pub row_number: usize,
    values: Vec<String>,
}

impl Record {
    /// Materialize a record from its 0-based index within the data region.
    pub fn from_row(index: usize, values: Vec<String>) -> Record {
        Record {
            row_number: index + 1,
            values,
        }
    }

    pub fn cell(&self, column: usize) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn approval(&self, cols: &Columns) -> ApprovalState {
        ApprovalState::from_cell(self.cell(cols.supervisor_approval))
    }

    pub fn event_status(&self, cols: &Columns) -> EventStatus {
        EventStatus::from_cell(self.cell(cols.event_status))
    }

    /// The one mutation the workflow performs. Writes the canonical status
    /// string, replacing whatever the cell held before.
    pub fn set_event_status(&mut self, cols: &Columns, status: EventStatus) {
        if self.values.len() <= cols.event_status {
            self.values.resize(cols.event_status + 1, String::new());
        }
        self.values[cols.event_status] = status.as_str().to_string();
    }

    pub fn start_date(&self, cols: &Columns) -> Result<NaiveDate, WorkflowError> {
        let raw = self.cell(cols.start_date);
        parse_sheet_date(raw).ok_or_else(|| WorkflowError::DateParse {
            field: "start date",
            value: raw.to_string(),
        })
    }

    pub fn end_date(&self, cols: &Columns) -> Result<NaiveDate, WorkflowError> {
        let raw = self.cell(cols.end_date);
        parse_sheet_date(raw).ok_or_else(|| WorkflowError::DateParse {
            field: "end date",
            value: raw.to_string(),
        })
    }

    /// The flat value row for write-back, still in header order.
    pub fn row(&self) -> &[String] {
        &self.values
    }
}

/// Parse a date cell as rendered by the sheet: ISO (2024-06-10) or the
/// US form date format (6/10/2024).
pub fn parse_sheet_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(cell, "%m/%d/%Y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers() -> Vec<String> {
        Header::ALL
            .iter()
            .map(|h| h.title().to_string())
            .collect()
    }

    fn sample_row() -> Vec<String> {
        vec![
            "6/7/2024 9:31:02".to_string(),
            "Dana Whitfield".to_string(),
            "dana@example.org".to_string(),
            "Midtown".to_string(),
            "2024-06-10".to_string(),
            "2024-06-14".to_string(),
            "Personal".to_string(),
            "Out hiking".to_string(),
            "boss@example.org".to_string(),
            "Approved".to_string(),
            "Approved".to_string(),
            "".to_string(),
        ]
    }

    #[test]
    fn test_resolve_finds_every_column() {
        let cols = Columns::resolve(&headers()).unwrap();
        assert_eq!(cols.timestamp, 0);
        assert_eq!(cols.event_status, 11);
    }

    #[test]
    fn test_resolve_reports_first_missing_header() {
        let mut hs = headers();
        hs.retain(|h| h != "HR approval" && h != "Calendar event status");
        let err = Columns::resolve(&hs).unwrap_err();
        match err {
            WorkflowError::MissingHeader { header, headers } => {
                assert_eq!(header, "HR approval");
                assert_eq!(headers.len(), 10);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resolve_ignores_column_order_and_extras() {
        let mut hs = headers();
        hs.insert(3, "Manager notes".to_string());
        let cols = Columns::resolve(&hs).unwrap();
        assert_eq!(cols.campus, 4);
        assert_eq!(cols.event_status, 12);
    }

    #[test]
    fn test_record_row_number_is_one_based() {
        let rec = Record::from_row(0, sample_row());
        assert_eq!(rec.row_number, 1);
        let rec = Record::from_row(4, sample_row());
        assert_eq!(rec.row_number, 5);
    }

    #[test]
    fn test_set_event_status_touches_only_that_cell() {
        let cols = Columns::resolve(&headers()).unwrap();
        let before = sample_row();
        let mut rec = Record::from_row(0, before.clone());
        rec.set_event_status(&cols, EventStatus::Created);

        for (i, cell) in rec.row().iter().enumerate() {
            if i == cols.event_status {
                assert_eq!(cell, "Event created");
            } else {
                assert_eq!(cell, &before[i]);
            }
        }
    }

    #[test]
    fn test_short_row_reads_as_empty_cells() {
        let cols = Columns::resolve(&headers()).unwrap();
        let rec = Record::from_row(0, vec!["ts".to_string(), "Pat Lane".to_string()]);
        assert_eq!(rec.cell(cols.full_name), "Pat Lane");
        assert_eq!(rec.cell(cols.event_status), "");
        assert_eq!(rec.event_status(&cols), EventStatus::NotCreated);
    }

    #[test]
    fn test_parse_sheet_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(parse_sheet_date("2024-06-10"), Some(expected));
        assert_eq!(parse_sheet_date("6/10/2024"), Some(expected));
        assert_eq!(parse_sheet_date(" 06/10/2024 "), Some(expected));
        assert_eq!(parse_sheet_date(""), None);
        assert_eq!(parse_sheet_date("next week"), None);
    }

    #[test]
    fn test_date_error_carries_raw_value() {
        let cols = Columns::resolve(&headers()).unwrap();
        let mut row = sample_row();
        row[4] = "soonish".to_string();
        let rec = Record::from_row(0, row);
        let err = rec.start_date(&cols).unwrap_err();
        assert!(err.to_string().contains("soonish"));
    }
}
