//! Google Forms API v1 — intake form provisioning.
//!
//! forms.create only accepts the title; every question is added afterwards
//! through a single batchUpdate of createItem requests. Answer validation
//! rules and form-to-sheet linking have no API surface, so those stay manual
//! (setup prints the steps).

use serde::Deserialize;

use super::{encode_path_segment, send_with_retry, GoogleApiError, RetryPolicy};

// ============================================================================
// Question model
// ============================================================================

/// One question to append to the form, in intake order.
#[derive(Debug, Clone)]
pub struct QuestionSpec {
    pub title: String,
    /// Guidance shown under the title.
    pub description: Option<String>,
    pub required: bool,
    pub kind: QuestionKind,
}

#[derive(Debug, Clone)]
pub enum QuestionKind {
    /// Single-line free text.
    Text,
    /// Date picker (year included, no time).
    Date,
    /// Single-select dropdown.
    Dropdown(Vec<String>),
    /// Checkbox group; the intake form uses a single-choice checkbox as an
    /// explicit attestation.
    Checkbox(Vec<String>),
}

impl QuestionSpec {
    pub fn text(title: &str, required: bool) -> QuestionSpec {
        QuestionSpec {
            title: title.to_string(),
            description: None,
            required,
            kind: QuestionKind::Text,
        }
    }

    pub fn date(title: &str, required: bool) -> QuestionSpec {
        QuestionSpec {
            title: title.to_string(),
            description: None,
            required,
            kind: QuestionKind::Date,
        }
    }

    pub fn dropdown(title: &str, choices: &[&str], required: bool) -> QuestionSpec {
        QuestionSpec {
            title: title.to_string(),
            description: None,
            required,
            kind: QuestionKind::Dropdown(choices.iter().map(|c| c.to_string()).collect()),
        }
    }

    pub fn checkbox(title: &str, choices: &[&str], required: bool) -> QuestionSpec {
        QuestionSpec {
            title: title.to_string(),
            description: None,
            required,
            kind: QuestionKind::Checkbox(choices.iter().map(|c| c.to_string()).collect()),
        }
    }

    pub fn with_description(mut self, description: &str) -> QuestionSpec {
        self.description = Some(description.to_string());
        self
    }
}

// ============================================================================
// API response types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedForm {
    pub form_id: String,
    /// Public link responders use to open the form.
    #[serde(default)]
    pub responder_uri: String,
}

// ============================================================================
// Forms API
// ============================================================================

/// Create an empty form with the given title.
pub async fn create_form(
    access_token: &str,
    title: &str,
) -> Result<CreatedForm, GoogleApiError> {
    let client = reqwest::Client::new();
    let body = serde_json::json!({
        "info": { "title": title, "documentTitle": title }
    });

    let resp = send_with_retry(
        client
            .post("https://forms.googleapis.com/v1/forms")
            .bearer_auth(access_token)
            .json(&body),
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

    let created: CreatedForm = resp.json().await?;
    Ok(created)
}

/// Append questions to a form, in order, via one batchUpdate.
pub async fn add_questions(
    access_token: &str,
    form_id: &str,
    questions: &[QuestionSpec],
) -> Result<(), GoogleApiError> {
    if questions.is_empty() {
        return Ok(());
    }

    let client = reqwest::Client::new();
    let url = format!(
        "https://forms.googleapis.com/v1/forms/{}:batchUpdate",
        encode_path_segment(form_id)
    );

    let requests: Vec<serde_json::Value> = questions
        .iter()
        .enumerate()
        .map(|(index, spec)| create_item_request(spec, index))
        .collect();
    let body = serde_json::json!({ "requests": requests });

    let resp = send_with_retry(
        client.post(&url).bearer_auth(access_token).json(&body),
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

    Ok(())
}

fn create_item_request(spec: &QuestionSpec, index: usize) -> serde_json::Value {
    let question = match &spec.kind {
        QuestionKind::Text => serde_json::json!({
            "required": spec.required,
            "textQuestion": { "paragraph": false }
        }),
        QuestionKind::Date => serde_json::json!({
            "required": spec.required,
            "dateQuestion": { "includeTime": false, "includeYear": true }
        }),
        QuestionKind::Dropdown(choices) => serde_json::json!({
            "required": spec.required,
            "choiceQuestion": {
                "type": "DROP_DOWN",
                "options": option_values(choices),
                "shuffle": false
            }
        }),
        QuestionKind::Checkbox(choices) => serde_json::json!({
            "required": spec.required,
            "choiceQuestion": {
                "type": "CHECKBOX",
                "options": option_values(choices),
                "shuffle": false
            }
        }),
    };

    let mut item = serde_json::json!({
        "title": spec.title,
        "questionItem": { "question": question }
    });
    if let Some(description) = &spec.description {
        item["description"] = serde_json::json!(description);
    }

    serde_json::json!({
        "createItem": {
            "item": item,
            "location": { "index": index }
        }
    })
}

fn option_values(choices: &[String]) -> Vec<serde_json::Value> {
    choices
        .iter()
        .map(|choice| serde_json::json!({ "value": choice }))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
