//! Capability seams over the hosted services the workflow touches: row
//! storage, mail, and calendar.
//!
//! The batch logic only ever sees these traits, so it runs against recording
//! fakes in tests and against the Google-backed host in production.

pub mod google;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::google_api::GoogleApiError;

/// An all-day calendar event, dates end-exclusive as the calendar API
/// consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllDayEvent {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub description: String,
    pub guests: Vec<String>,
    pub send_invites: bool,
}

/// Everything read from the tracking sheet in one shot: the frozen-row
/// offset, the header row, and the data rows below it.
#[derive(Debug, Clone)]
pub struct SheetSnapshot {
    pub frozen_rows: usize,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read/write access to the tracking sheet's rows.
#[async_trait]
pub trait SheetRows: Send + Sync {
    /// Read the full data region once. The batch never re-reads mid-run.
    async fn snapshot(&self) -> Result<SheetSnapshot, GoogleApiError>;

    /// Overwrite exactly one row, addressed by absolute sheet row number
    /// (1-based, header rows included).
    async fn write_row(&self, sheet_row: usize, values: &[String]) -> Result<(), GoogleApiError>;
}

/// Sends a plain-text notification email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), GoogleApiError>;
}

/// Creates calendar events on a calendar the authorized account can write to.
#[async_trait]
pub trait Calendar: Send + Sync {
    async fn create_all_day_event(
        &self,
        calendar_id: &str,
        event: &AllDayEvent,
    ) -> Result<(), GoogleApiError>;
}
