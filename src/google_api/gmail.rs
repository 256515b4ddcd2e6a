//! Gmail API v1 — notification sending.
//!
//! messages.send takes the full RFC 2822 message, URL-safe base64 encoded,
//! in the `raw` field. The message is assembled here: plain-text body,
//! UTF-8 subject encoded as an RFC 2047 word only when it needs to be.

use base64::Engine;
use serde::Deserialize;

use super::{send_with_retry, GoogleApiError, RetryPolicy};

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub label_ids: Vec<String>,
}

// ============================================================================
// Gmail API
// ============================================================================

/// Send a plain-text email from the authorized account.
pub async fn send_message(
    access_token: &str,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<SentMessage, GoogleApiError> {
    let raw = encode_raw_message(to, subject, body);

    let client = reqwest::Client::new();
    let payload = serde_json::json!({ "raw": raw });

    let resp = send_with_retry(
        client
            .post("https://gmail.googleapis.com/gmail/v1/users/me/messages/send")
            .bearer_auth(access_token)
            .json(&payload),
        &RetryPolicy::default(),
    )
    .await?;

    let status = resp.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(GoogleApiError::AuthExpired);
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(GoogleApiError::ApiError {
            status: status.as_u16(),
            message: body,
        });
    }

    let sent: SentMessage = resp.json().await?;
    Ok(sent)
}

// ============================================================================
// Message assembly
// ============================================================================

/// Build the RFC 2822 message and encode it URL-safe base64 (no padding),
/// the shape Gmail's `raw` field expects.
fn encode_raw_message(to: &str, subject: &str, body: &str) -> String {
    let message = build_mime_message(to, subject, body);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(message.as_bytes())
}

/// Assemble a minimal plain-text RFC 2822 message. Gmail fills in From,
/// Date and Message-ID from the authorized account.
fn build_mime_message(to: &str, subject: &str, body: &str) -> String {
    format!(
        "To: {}\r\n\
         Subject: {}\r\n\
         MIME-Version: 1.0\r\n\
         Content-Type: text/plain; charset=\"UTF-8\"\r\n\
         Content-Transfer-Encoding: 8bit\r\n\
         \r\n\
         {}",
        to,
        encode_subject(subject),
        body
    )
}

/// RFC 2047 encoded-word for the Subject header, applied only when the
/// subject leaves printable ASCII.
fn encode_subject(subject: &str) -> String {
    let plain_ascii = subject
        .chars()
        .all(|c| c.is_ascii() && !c.is_ascii_control());
    if plain_ascii {
        subject.to_string()
    } else {
        format!(
            "=?UTF-8?B?{}?=",
            base64::engine::general_purpose::STANDARD.encode(subject.as_bytes())
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_message_layout() {
        let message = build_mime_message(
            "dana@example.org",
            "Your vacation time request failed, contact Josh McKenna",
            "Your Personal request was Not approved for Mon Jun 10 2024 to Fri Jun 14 2024\n\nOut hiking",
        );

        assert!(message.starts_with("To: dana@example.org\r\n"));
        assert!(message.contains("Subject: Your vacation time request failed, contact Josh McKenna\r\n"));
        assert!(message.contains("Content-Type: text/plain; charset=\"UTF-8\"\r\n"));

        // Headers and body are separated by exactly one blank line.
        let (headers, body) = message.split_once("\r\n\r\n").unwrap();
        assert!(!headers.contains("\r\n\r\n"));
        assert!(body.starts_with("Your Personal request was"));
    }

    #[test]
    fn test_ascii_subject_passes_through() {
        assert_eq!(encode_subject("Plain subject"), "Plain subject");
    }

    #[test]
    fn test_utf8_subject_becomes_encoded_word() {
        let encoded = encode_subject("Congé refusé");
        assert!(encoded.starts_with("=?UTF-8?B?"));
        assert!(encoded.ends_with("?="));

        let b64 = encoded
            .strip_prefix("=?UTF-8?B?")
            .and_then(|s| s.strip_suffix("?="))
            .unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(b64)
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "Congé refusé");
    }

    #[test]
    fn test_raw_encoding_is_url_safe_without_padding() {
        let raw = encode_raw_message("a@b.c", "Hi", "Body text?>");
        assert!(!raw.contains('='));
        assert!(!raw.contains('+'));
        assert!(!raw.contains('/'));

        let decoded = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(&raw)
            .unwrap();
        let text = String::from_utf8(decoded).unwrap();
        assert!(text.starts_with("To: a@b.c\r\n"));
        assert!(text.ends_with("Body text?>"));
    }

    #[test]
    fn test_sent_message_deserialization() {
        let json = r#"{
            "id": "18f3b2a1c4d5e6f7",
            "threadId": "18f3b2a1c4d5e6f7",
            "labelIds": ["SENT"]
        }"#;

        let sent: SentMessage = serde_json::from_str(json).unwrap();
        assert_eq!(sent.id, "18f3b2a1c4d5e6f7");
        assert_eq!(sent.label_ids, vec!["SENT"]);
    }
}
