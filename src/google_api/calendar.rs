//! Google Calendar API v3 — all-day event creation.
//!
//! Events are inserted on the submitter's primary calendar (addressed by
//! email) with the shared out-of-office resource calendar attending, so the
//! time off shows up in both places. `sendUpdates=all` makes Calendar email
//! the invites.

use serde::{Deserialize, Serialize};

use super::{encode_path_segment, send_with_retry, GoogleApiError, RetryPolicy};

// ============================================================================
// Request/response types (Google Calendar JSON)
// ============================================================================

/// events.insert request body for an all-day event.
///
/// All-day events carry `start.date`/`end.date` (no time component); the end
/// date is exclusive per the API contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInsert {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDate,
    pub end: EventDate,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<AttendeeRef>,
}

/// Date-only boundary of an all-day event (YYYY-MM-DD).
#[derive(Debug, Clone, Serialize)]
pub struct EventDate {
    pub date: String,
}

impl EventDate {
    pub fn from_naive(date: chrono::NaiveDate) -> EventDate {
        EventDate {
            date: date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendeeRef {
    pub email: String,
}

/// The slice of the created event the caller logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub html_link: Option<String>,
}

// ============================================================================
// Calendar API
// ============================================================================

/// Insert an event on the given calendar, emailing invites to all guests.
pub async fn insert_event(
    access_token: &str,
    calendar_id: &str,
    event: &EventInsert,
) -> Result<CreatedEvent, GoogleApiError> {
    let client = reqwest::Client::new();
    let url = format!(
        "https://www.googleapis.com/calendar/v3/calendars/{}/events",
        encode_path_segment(calendar_id)
    );

    let resp = send_with_retry(
        client
            .post(&url)
            .bearer_auth(access_token)
            .query(&[("sendUpdates", "all")])
            .json(event),
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

    let created: CreatedEvent = resp.json().await?;
    Ok(created)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_insert_serialization() {
        let event = EventInsert {
            summary: "Dana Whitfield - Personal".to_string(),
            description: Some("Approved by boss@example.org on 6-15-2024\n\nOut hiking".to_string()),
            start: EventDate::from_naive(chrono::NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()),
            end: EventDate::from_naive(chrono::NaiveDate::from_ymd_opt(2024, 6, 16).unwrap()),
            attendees: vec![AttendeeRef {
                email: "ooo@resource.calendar.google.com".to_string(),
            }],
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["summary"], "Dana Whitfield - Personal");
        assert_eq!(json["start"]["date"], "2024-06-11");
        assert_eq!(json["end"]["date"], "2024-06-16");
        assert_eq!(
            json["attendees"][0]["email"],
            "ooo@resource.calendar.google.com"
        );
        // All-day events must not carry a dateTime field.
        assert!(json["start"].get("dateTime").is_none());
    }

    #[test]
    fn test_event_insert_omits_empty_optionals() {
        let event = EventInsert {
            summary: "Quiet day".to_string(),
            description: None,
            start: EventDate::from_naive(chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()),
            end: EventDate::from_naive(chrono::NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()),
            attendees: vec![],
        };

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("description").is_none());
        assert!(json.get("attendees").is_none());
    }

    #[test]
    fn test_created_event_deserialization() {
        let json = r#"{
            "kind": "calendar#event",
            "id": "abc123def",
            "status": "confirmed",
            "htmlLink": "https://www.google.com/calendar/event?eid=xyz",
            "summary": "Dana Whitfield - Personal",
            "start": {"date": "2024-06-11"},
            "end": {"date": "2024-06-16"}
        }"#;

        let created: CreatedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(created.id, "abc123def");
        assert_eq!(created.status.as_deref(), Some("confirmed"));
        assert!(created.html_link.unwrap().contains("calendar/event"));
    }

    #[test]
    fn test_event_date_formats_with_zero_padding() {
        let date = EventDate::from_naive(chrono::NaiveDate::from_ymd_opt(2024, 3, 7).unwrap());
        assert_eq!(date.date, "2024-03-07");
    }
}
