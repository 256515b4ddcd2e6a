//! Deployment configuration: ~/.oooflow/config.json.
//!
//! The spreadsheet id is the one field with no default; everything else
//! falls back to the values the workflow has always shipped with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Id of the tracking spreadsheet (from its URL).
    pub spreadsheet_id: String,
    /// Tab holding the form responses.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Shared out-of-office resource calendar, invited to every event.
    #[serde(default = "default_ooo_calendar")]
    pub ooo_calendar: String,
    /// Name surfaced in the rejection email subject.
    #[serde(default = "default_rejection_contact")]
    pub rejection_contact: String,
    /// Id of the intake form, recorded when `setup-form` creates it. Guards
    /// against provisioning a second form over the same sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<String>,
}

fn default_sheet_name() -> String {
    "Form Responses 1".to_string()
}

fn default_ooo_calendar() -> String {
    "grace-bible.org_323330343338383235@resource.calendar.google.com".to_string()
}

fn default_rejection_contact() -> String {
    "Josh McKenna".to_string()
}

/// Canonical config file path (~/.oooflow/config.json).
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".oooflow")
        .join("config.json")
}

/// Load configuration, with a create-it-like-this hint when missing.
pub fn load_config() -> Result<Config, WorkflowError> {
    load_config_from(&config_path())
}

fn load_config_from(path: &Path) -> Result<Config, WorkflowError> {
    if !path.exists() {
        return Err(WorkflowError::Config(format!(
            "Config file not found at {}. Create it with: {{ \"spreadsheetId\": \"<id from the sheet URL>\" }}",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| WorkflowError::Config(format!("Failed to read config: {}", e)))?;
    let config: Config = serde_json::from_str(&content)
        .map_err(|e| WorkflowError::Config(format!("Failed to parse config: {}", e)))?;

    if config.spreadsheet_id.trim().is_empty() {
        return Err(WorkflowError::Config(
            "spreadsheetId is empty in config".to_string(),
        ));
    }

    Ok(config)
}

/// Write configuration back (atomic; creates ~/.oooflow/ on first save).
pub fn save_config(config: &Config) -> Result<(), WorkflowError> {
    save_config_to(&config_path(), config)
}

fn save_config_to(path: &Path, config: &Config) -> Result<(), WorkflowError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)
                .map_err(|e| WorkflowError::Config(format!("Failed to create config dir: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(config)
        .map_err(|e| WorkflowError::Config(format!("Failed to serialize config: {}", e)))?;
    crate::util::atomic_write_str(path, &content)
        .map_err(|e| WorkflowError::Config(format!("Failed to write config: {}", e)))?;

    Ok(())
}
