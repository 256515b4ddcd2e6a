//! Out-of-office request workflow over Google Workspace: a Forms intake
//! feeds a tracking sheet, and the create batch turns approved rows into
//! all-day calendar events and rejected rows into notification emails.

pub mod config;
pub mod error;
pub mod google_api;
pub mod host;
pub mod process;
pub mod record;
pub mod schema;
pub mod setup;
mod util;
pub mod workflow;
