//! Google-backed implementations of the host capabilities.
//!
//! Each call fetches a valid access token first (refreshing if needed), so a
//! long batch never trips over mid-run expiry.

use async_trait::async_trait;

use crate::config::Config;
use crate::google_api::{calendar, get_valid_access_token, gmail, sheets, GoogleApiError};

use super::{AllDayEvent, Calendar, Mailer, SheetRows, SheetSnapshot};

/// The tracking sheet, addressed by spreadsheet id + tab title.
pub struct GoogleSheet {
    spreadsheet_id: String,
    sheet_name: String,
}

impl GoogleSheet {
    pub fn new(config: &Config) -> GoogleSheet {
        GoogleSheet {
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
        }
    }
}

#[async_trait]
impl SheetRows for GoogleSheet {
    async fn snapshot(&self) -> Result<SheetSnapshot, GoogleApiError> {
        let token = get_valid_access_token().await?;
        let props =
            sheets::get_sheet_properties(&token, &self.spreadsheet_id, &self.sheet_name).await?;
        let values = sheets::get_values(
            &token,
            &self.spreadsheet_id,
            &sheets::quote_sheet_title(&self.sheet_name),
        )
        .await?;

        Ok(shape_snapshot(props.frozen_rows, values))
    }

    async fn write_row(&self, sheet_row: usize, values: &[String]) -> Result<(), GoogleApiError> {
        let token = get_valid_access_token().await?;
        let range = sheets::row_range(&self.sheet_name, sheet_row, values.len());
        sheets::update_values(
            &token,
            &self.spreadsheet_id,
            &range,
            vec![values.to_vec()],
        )
        .await
    }
}

/// Split the raw cell grid into header row + data rows, padding each data
/// row to header width (values.get trims trailing empty cells, but the row
/// model's contract is equal-length rows).
fn shape_snapshot(frozen_rows: usize, mut values: Vec<Vec<String>>) -> SheetSnapshot {
    if values.is_empty() {
        return SheetSnapshot {
            frozen_rows,
            headers: Vec::new(),
            rows: Vec::new(),
        };
    }

    let headers = values.remove(0);
    let width = headers.len();
    for row in &mut values {
        if row.len() < width {
            row.resize(width, String::new());
        }
    }

    SheetSnapshot {
        frozen_rows,
        headers,
        rows: values,
    }
}

/// Sends notification mail from the authorized account.
pub struct GoogleMailer;

#[async_trait]
impl Mailer for GoogleMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), GoogleApiError> {
        let token = get_valid_access_token().await?;
        let sent = gmail::send_message(&token, to, subject, body).await?;
        log::debug!("sent mail {} to {}", sent.id, to);
        Ok(())
    }
}

/// Creates events on any calendar the authorized account can write to.
pub struct GoogleCalendar;

#[async_trait]
impl Calendar for GoogleCalendar {
    async fn create_all_day_event(
        &self,
        calendar_id: &str,
        event: &AllDayEvent,
    ) -> Result<(), GoogleApiError> {
        let token = get_valid_access_token().await?;

        let insert = calendar::EventInsert {
            summary: event.title.clone(),
            description: if event.description.is_empty() {
                None
            } else {
                Some(event.description.clone())
            },
            start: calendar::EventDate::from_naive(event.start),
            end: calendar::EventDate::from_naive(event.end),
            attendees: if event.send_invites {
                event
                    .guests
                    .iter()
                    .map(|email| calendar::AttendeeRef {
                        email: email.clone(),
                    })
                    .collect()
            } else {
                Vec::new()
            },
        };

        let created = calendar::insert_event(&token, calendar_id, &insert).await?;
        log::debug!("created event {} on {}", created.id, calendar_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_shape_snapshot_splits_header_and_pads_rows() {
        let values = grid(&[
            &["Timestamp", "Name", "Email Address"],
            &["6/7/2024", "Dana Whitfield", "dana@example.org"],
            &["6/8/2024", "Pat Lane"],
        ]);
        let snapshot = shape_snapshot(1, values);

        assert_eq!(snapshot.frozen_rows, 1);
        assert_eq!(snapshot.headers.len(), 3);
        assert_eq!(snapshot.rows.len(), 2);
        // Short row padded to header width.
        assert_eq!(snapshot.rows[1].len(), 3);
        assert_eq!(snapshot.rows[1][2], "");
    }

    #[test]
    fn test_shape_snapshot_empty_sheet() {
        let snapshot = shape_snapshot(0, Vec::new());
        assert!(snapshot.headers.is_empty());
        assert!(snapshot.rows.is_empty());
    }

    #[test]
    fn test_shape_snapshot_header_only_sheet_has_no_rows() {
        let snapshot = shape_snapshot(1, grid(&[&["Timestamp", "Name"]]));
        assert_eq!(snapshot.headers, vec!["Timestamp", "Name"]);
        assert!(snapshot.rows.is_empty());
    }

    #[test]
    fn test_shape_snapshot_keeps_extra_wide_rows() {
        // A row wider than the header row is left alone; the row model reads
        // cells by resolved column index and write-back preserves the extras.
        let values = grid(&[&["A", "B"], &["1", "2", "stray"]]);
        let snapshot = shape_snapshot(1, values);
        assert_eq!(snapshot.rows[0].len(), 3);
    }
}
