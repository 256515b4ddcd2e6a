//! Google API clients: OAuth2 token lifecycle plus thin wrappers over the
//! Sheets, Calendar, Gmail and Forms REST endpoints, all on plain reqwest.
//!
//! The token file format matches what Google's own client libraries write,
//! so a token minted elsewhere can be dropped into ~/.oooflow/google/ as is.
//!
//! Modules:
//! - auth: OAuth2 browser consent flow
//! - calendar: Calendar API v3 (event creation)
//! - forms: Forms API v1 (intake form provisioning)
//! - gmail: Gmail API v1 (notification sending)
//! - sheets: Sheets API v4 (tracking sheet reads/writes)
//! - token_store: on-disk token persistence

pub mod auth;
pub mod calendar;
pub mod forms;
pub mod gmail;
pub mod sheets;
pub mod token_store;

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// OAuth2 scopes the workflow needs: read/write the tracking sheet, create
/// events on submitter calendars, send rejection mail, provision the form.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/spreadsheets",
    "https://www.googleapis.com/auth/calendar",
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/forms.body",
];

// ============================================================================
// Token types
// ============================================================================

/// OAuth2 token payload persisted under ~/.oooflow/google/.
///
/// Field names follow the Credentials JSON Google's client libraries emit;
/// both `token` and `access_token` are accepted on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleToken {
    #[serde(alias = "access_token")]
    pub token: String,
    /// Long-lived refresh token used to mint new access tokens.
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Access token expiry (ISO 8601).
    #[serde(default)]
    pub expiry: Option<String>,
    /// Authenticated account email.
    #[serde(default, alias = "email")]
    pub account: Option<String>,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// OAuth2 client credentials from credentials.json (Desktop App type).
#[derive(Debug, Clone, Deserialize)]
pub struct ClientCredentials {
    pub installed: InstalledAppCredentials,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstalledAppCredentials {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub auth_uri: String,
    pub token_uri: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

// ============================================================================
// Error type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Token expired or revoked; run `oooflow auth` again")]
    AuthExpired,
    #[error("Credentials not found at {0}")]
    CredentialsNotFound(PathBuf),
    #[error("Token not found at {0}; run `oooflow auth` first")]
    TokenNotFound(PathBuf),
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("Sheet {0:?} not found in spreadsheet")]
    SheetNotFound(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("OAuth flow cancelled")]
    FlowCancelled,
    #[error("Invalid credentials format: {0}")]
    InvalidCredentials(String),
}

// ============================================================================
// Transport retry
// ============================================================================

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
            max_backoff_ms: 2_000,
        }
    }
}

fn status_is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn retry_delay(
    attempt: u32,
    policy: &RetryPolicy,
    retry_after: Option<&reqwest::header::HeaderValue>,
) -> Duration {
    if let Some(value) = retry_after.and_then(|v| v.to_str().ok()) {
        if let Ok(secs) = value.parse::<u64>() {
            return Duration::from_secs(secs.min(30));
        }
    }

    let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
    let base = policy
        .initial_backoff_ms
        .saturating_mul(exponent)
        .min(policy.max_backoff_ms);
    let jitter = (std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0))
        % 150;
    Duration::from_millis(base.saturating_add(jitter))
}

/// Send a request, retrying transient failures (429/408/5xx and transport
/// errors) with Retry-After-aware backoff. A response that still fails after
/// the last attempt is returned to the caller, which surfaces it as an
/// `ApiError` and aborts the run.
pub async fn send_with_retry(
    request: reqwest::RequestBuilder,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, GoogleApiError> {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        let Some(cloned) = request.try_clone() else {
            return request.send().await.map_err(GoogleApiError::Http);
        };

        match cloned.send().await {
            Ok(response) => {
                let status = response.status();
                if status_is_retryable(status) && attempt < attempts {
                    let delay = retry_delay(
                        attempt,
                        policy,
                        response.headers().get(reqwest::header::RETRY_AFTER),
                    );
                    log::warn!(
                        "google api retry {}/{} after status {} (sleep {:?})",
                        attempt,
                        attempts,
                        status,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Ok(response);
            }
            Err(err) => {
                let retryable_transport = err.is_timeout() || err.is_connect();
                if retryable_transport && attempt < attempts {
                    let delay = retry_delay(attempt, policy, None);
                    log::warn!(
                        "google api retry {}/{} after transport error: {} (sleep {:?})",
                        attempt,
                        attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(GoogleApiError::Http(err));
            }
        }
    }

    Err(GoogleApiError::RefreshFailed(
        "request exhausted retries".to_string(),
    ))
}

/// Percent-encode a value for use as a URL path segment (calendar ids are
/// email addresses, sheet ranges carry quotes and spaces). Unlike form
/// encoding, spaces become %20 — a `+` in a path is a literal plus.
pub(crate) fn encode_path_segment(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

// ============================================================================
// Paths and credential loading
// ============================================================================

/// Path to the persisted OAuth token.
pub fn token_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".oooflow")
        .join("google")
        .join("token.json")
}

/// Path to the OAuth client credentials file.
pub fn credentials_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".oooflow")
        .join("google")
        .join("credentials.json")
}

/// Load the Desktop App OAuth client from credentials.json.
///
/// There are no embedded defaults: each deployment registers its own client
/// in Google Cloud and drops the downloaded file at the expected path.
pub fn load_credentials() -> Result<ClientCredentials, GoogleApiError> {
    let path = credentials_path();
    if !path.exists() {
        return Err(GoogleApiError::CredentialsNotFound(path));
    }
    let content = std::fs::read_to_string(&path)?;
    let creds: ClientCredentials = serde_json::from_str(&content)
        .map_err(|e| GoogleApiError::InvalidCredentials(format!("{}: {}", path.display(), e)))?;
    Ok(creds)
}

// ============================================================================
// Token refresh
// ============================================================================

/// Check if a token is expired based on its expiry field. Tokens within 60
/// seconds of expiry count as expired so an in-flight batch never races the
/// deadline.
pub fn is_token_expired(token: &GoogleToken) -> bool {
    match &token.expiry {
        None => true,
        Some(expiry_str) => {
            match chrono::DateTime::parse_from_rfc3339(&expiry_str.replace('Z', "+00:00"))
                .or_else(|_| chrono::DateTime::parse_from_rfc3339(expiry_str))
            {
                Ok(expiry) => {
                    let now = chrono::Utc::now();
                    expiry <= now + chrono::Duration::seconds(60)
                }
                Err(_) => true,
            }
        }
    }
}

/// Refresh the access token using the stored refresh token and persist the
/// result.
pub async fn refresh_access_token(token: &GoogleToken) -> Result<GoogleToken, GoogleApiError> {
    let refresh_token = token
        .refresh_token
        .as_ref()
        .ok_or(GoogleApiError::AuthExpired)?;

    let client = reqwest::Client::new();
    let mut form = vec![
        ("client_id", token.client_id.as_str()),
        ("refresh_token", refresh_token.as_str()),
        ("grant_type", "refresh_token"),
    ];
    if let Some(secret) = token.client_secret.as_deref() {
        form.push(("client_secret", secret));
    }

    let resp = client.post(&token.token_uri).form(&form).send().await?;
    let status = resp.status();
    let body_text = resp.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(map_refresh_error(status.as_u16(), &body_text));
    }

    let body: serde_json::Value = serde_json::from_str(&body_text)?;
    let access_token = body["access_token"]
        .as_str()
        .ok_or_else(|| GoogleApiError::RefreshFailed("No access_token in response".into()))?;
    let expires_in = body["expires_in"].as_u64().unwrap_or(3600);
    let expiry = chrono::Utc::now() + chrono::Duration::seconds(expires_in as i64);

    let mut new_token = token.clone();
    new_token.token = access_token.to_string();
    new_token.expiry = Some(expiry.to_rfc3339());
    token_store::save_token(&new_token)?;

    Ok(new_token)
}

fn map_refresh_error(status: u16, body: &str) -> GoogleApiError {
    let lowered = body.to_lowercase();
    if (status == 400 || status == 401)
        && (lowered.contains("invalid_grant") || lowered.contains("token has been expired"))
    {
        return GoogleApiError::AuthExpired;
    }
    GoogleApiError::RefreshFailed(format!("HTTP {}: {}", status, body))
}

/// Get a valid access token, refreshing if expired. Entry point for every
/// API call path.
pub async fn get_valid_access_token() -> Result<String, GoogleApiError> {
    let token = token_store::load_token()?;

    if is_token_expired(&token) {
        let refreshed = refresh_access_token(&token).await?;
        Ok(refreshed.token)
    } else {
        Ok(token.token)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_expiry(expiry: Option<String>) -> GoogleToken {
        GoogleToken {
            token: "ya29.test".to_string(),
            refresh_token: None,
            token_uri: default_token_uri(),
            client_id: "client".to_string(),
            client_secret: None,
            scopes: vec![],
            expiry,
            account: None,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = GoogleToken {
            token: "ya29.access".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: default_token_uri(),
            client_id: "1234.apps.googleusercontent.com".to_string(),
            client_secret: Some("secret".to_string()),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            expiry: Some("2026-03-01T12:00:00Z".to_string()),
            account: Some("office@example.org".to_string()),
        };

        let json = serde_json::to_string_pretty(&token).unwrap();
        let parsed: GoogleToken = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.token, "ya29.access");
        assert_eq!(parsed.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(parsed.scopes.len(), 4);
        assert_eq!(parsed.account.as_deref(), Some("office@example.org"));
    }

    #[test]
    fn test_token_accepts_access_token_alias() {
        let json = r#"{
            "access_token": "ya29.alias",
            "refresh_token": "1//refresh",
            "client_id": "client"
        }"#;
        let token: GoogleToken = serde_json::from_str(json).unwrap();
        assert_eq!(token.token, "ya29.alias");
        assert_eq!(token.token_uri, default_token_uri());
    }

    #[test]
    fn test_token_without_expiry_counts_as_expired() {
        assert!(is_token_expired(&token_with_expiry(None)));
    }

    #[test]
    fn test_token_expiry_future_and_past() {
        let future = chrono::Utc::now() + chrono::Duration::hours(1);
        assert!(!is_token_expired(&token_with_expiry(Some(
            future.to_rfc3339()
        ))));

        let past = chrono::Utc::now() - chrono::Duration::hours(1);
        assert!(is_token_expired(&token_with_expiry(Some(past.to_rfc3339()))));
    }

    #[test]
    fn test_token_expiry_with_fractional_z_suffix() {
        let future = chrono::Utc::now() + chrono::Duration::hours(1);
        let python_style = future.format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string();
        assert!(!is_token_expired(&token_with_expiry(Some(python_style))));
    }

    #[test]
    fn test_credentials_parsing_with_and_without_secret() {
        let json = r#"{
            "installed": {
                "client_id": "1234.apps.googleusercontent.com",
                "client_secret": "secret",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token",
                "redirect_uris": ["http://localhost"]
            }
        }"#;
        let creds: ClientCredentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.installed.client_secret.as_deref(), Some("secret"));

        let json = r#"{
            "installed": {
                "client_id": "1234.apps.googleusercontent.com",
                "auth_uri": "https://accounts.google.com/o/oauth2/auth",
                "token_uri": "https://oauth2.googleapis.com/token"
            }
        }"#;
        let creds: ClientCredentials = serde_json::from_str(json).unwrap();
        assert!(creds.installed.client_secret.is_none());
        assert!(creds.installed.redirect_uris.is_empty());
    }

    #[test]
    fn test_encode_path_segment() {
        assert_eq!(
            encode_path_segment("dana@example.org"),
            "dana%40example.org"
        );
        assert_eq!(
            encode_path_segment("'Form Responses 1'!A5:L5"),
            "%27Form%20Responses%201%27%21A5%3AL5"
        );
        assert_eq!(encode_path_segment("Sheet1"), "Sheet1");
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(status_is_retryable(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(status_is_retryable(reqwest::StatusCode::BAD_GATEWAY));
        assert!(!status_is_retryable(reqwest::StatusCode::FORBIDDEN));
        assert!(!status_is_retryable(reqwest::StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_refresh_error_mapping() {
        assert!(matches!(
            map_refresh_error(400, r#"{"error": "invalid_grant"}"#),
            GoogleApiError::AuthExpired
        ));
        assert!(matches!(
            map_refresh_error(500, "upstream broke"),
            GoogleApiError::RefreshFailed(_)
        ));
    }
}
