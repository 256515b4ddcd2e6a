//! Google Sheets API v4 — tracking-sheet reads and writes.
//!
//! The batch reads the whole data region in one values.get, writes single
//! rows back with values.update, and provisions dropdown validation via
//! batchUpdate setDataValidation.

use serde::Deserialize;

use super::{encode_path_segment, send_with_retry, GoogleApiError, RetryPolicy};

// ============================================================================
// API response types (deserialized from Google Sheets JSON)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResponse {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetEntry {
    properties: SheetPropertiesRaw,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetPropertiesRaw {
    #[serde(default)]
    sheet_id: i64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    grid_properties: GridPropertiesRaw,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridPropertiesRaw {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
    #[serde(default)]
    frozen_row_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRangeResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

// ============================================================================
// Public types
// ============================================================================

/// Properties of one sheet (tab) inside a spreadsheet.
#[derive(Debug, Clone)]
pub struct SheetProperties {
    /// Numeric grid id used by batchUpdate requests.
    pub sheet_id: i64,
    pub title: String,
    pub row_count: usize,
    pub column_count: usize,
    /// Header rows pinned above the data region.
    pub frozen_rows: usize,
}

// ============================================================================
// Sheets API
// ============================================================================

/// Fetch the properties of the named sheet within a spreadsheet.
pub async fn get_sheet_properties(
    access_token: &str,
    spreadsheet_id: &str,
    sheet_title: &str,
) -> Result<SheetProperties, GoogleApiError> {
    let client = reqwest::Client::new();
    let url = format!(
        "https://sheets.googleapis.com/v4/spreadsheets/{}",
        spreadsheet_id
    );

    let resp = send_with_retry(
        client.get(&url).bearer_auth(access_token).query(&[(
            "fields",
            "sheets(properties(sheetId,title,gridProperties(rowCount,columnCount,frozenRowCount)))",
        )]),
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

    let body: SpreadsheetResponse = resp.json().await?;

    body.sheets
        .into_iter()
        .map(|entry| entry.properties)
        .find(|props| props.title == sheet_title)
        .map(|props| SheetProperties {
            sheet_id: props.sheet_id,
            title: props.title,
            row_count: props.grid_properties.row_count,
            column_count: props.grid_properties.column_count,
            frozen_rows: props.grid_properties.frozen_row_count,
        })
        .ok_or_else(|| GoogleApiError::SheetNotFound(sheet_title.to_string()))
}

/// Read a range of cell values, rendered the way the sheet displays them.
///
/// Passing the bare (quoted) sheet title as the range returns the whole data
/// region. Trailing empty cells and rows are trimmed by the API; callers that
/// need fixed-width rows pad them afterwards.
pub async fn get_values(
    access_token: &str,
    spreadsheet_id: &str,
    range: &str,
) -> Result<Vec<Vec<String>>, GoogleApiError> {
    let client = reqwest::Client::new();
    let url = format!(
        "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
        spreadsheet_id,
        encode_path_segment(range)
    );

    let resp = send_with_retry(
        client
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("valueRenderOption", "FORMATTED_VALUE")]),
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

    let body: ValueRangeResponse = resp.json().await?;
    Ok(body
        .values
        .into_iter()
        .map(|row| row.into_iter().map(cell_to_string).collect())
        .collect())
}

/// Overwrite a range with the given values (USER_ENTERED, so date strings
/// re-enter as dates exactly as if typed into the cell).
pub async fn update_values(
    access_token: &str,
    spreadsheet_id: &str,
    range: &str,
    values: Vec<Vec<String>>,
) -> Result<(), GoogleApiError> {
    let client = reqwest::Client::new();
    let url = format!(
        "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}",
        spreadsheet_id,
        encode_path_segment(range)
    );

    let body = serde_json::json!({ "values": values });

    let resp = send_with_retry(
        client
            .put(&url)
            .bearer_auth(access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
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

    Ok(())
}

/// Attach a ONE_OF_LIST dropdown rule to one column, from `start_row_index`
/// (0-based, typically the first row below the frozen header) down to the end
/// of the sheet.
pub async fn set_column_validation(
    access_token: &str,
    spreadsheet_id: &str,
    sheet_id: i64,
    column_index: usize,
    start_row_index: usize,
    choices: &[&str],
) -> Result<(), GoogleApiError> {
    let client = reqwest::Client::new();
    let url = format!(
        "https://sheets.googleapis.com/v4/spreadsheets/{}:batchUpdate",
        spreadsheet_id
    );

    let body = validation_request(sheet_id, column_index, start_row_index, choices);

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

fn validation_request(
    sheet_id: i64,
    column_index: usize,
    start_row_index: usize,
    choices: &[&str],
) -> serde_json::Value {
    let values: Vec<serde_json::Value> = choices
        .iter()
        .map(|choice| serde_json::json!({ "userEnteredValue": choice }))
        .collect();

    serde_json::json!({
        "requests": [{
            "setDataValidation": {
                "range": {
                    "sheetId": sheet_id,
                    "startRowIndex": start_row_index,
                    "startColumnIndex": column_index,
                    "endColumnIndex": column_index + 1
                },
                "rule": {
                    "condition": {
                        "type": "ONE_OF_LIST",
                        "values": values
                    },
                    "showCustomUi": true
                }
            }
        }]
    })
}

/// Grow the grid by `count` columns on the right. Linked response sheets are
/// created exactly as wide as their fields, so writes past the last column
/// need this first.
pub async fn append_columns(
    access_token: &str,
    spreadsheet_id: &str,
    sheet_id: i64,
    count: usize,
) -> Result<(), GoogleApiError> {
    let client = reqwest::Client::new();
    let url = format!(
        "https://sheets.googleapis.com/v4/spreadsheets/{}:batchUpdate",
        spreadsheet_id
    );

    let body = serde_json::json!({
        "requests": [{
            "appendDimension": {
                "sheetId": sheet_id,
                "dimension": "COLUMNS",
                "length": count
            }
        }]
    });

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

// ============================================================================
// A1 notation helpers
// ============================================================================

/// 0-based column index to its A1 letter: 0 → A, 25 → Z, 26 → AA.
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// A1 reference to a single cell, 0-based column and row indices.
pub fn cell_ref(sheet_title: &str, column_index: usize, row_index: usize) -> String {
    format!(
        "{}!{}{}",
        quote_sheet_title(sheet_title),
        column_letter(column_index),
        row_index + 1
    )
}

/// A1 range spanning one whole row of `width` columns, 1-based row number.
pub fn row_range(sheet_title: &str, row_number: usize, width: usize) -> String {
    let last = column_letter(width.saturating_sub(1));
    format!(
        "{}!A{}:{}{}",
        quote_sheet_title(sheet_title),
        row_number,
        last,
        row_number
    )
}

/// Quote a sheet title for A1 notation. Titles with anything beyond
/// alphanumerics need single quotes, with embedded quotes doubled.
pub fn quote_sheet_title(title: &str) -> String {
    if !title.is_empty() && title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}

/// Render one cell of a FORMATTED_VALUE response as the displayed string.
fn cell_to_string(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_properties_deserialization() {
        let json = r#"{
            "sheets": [
                {
                    "properties": {
                        "sheetId": 0,
                        "title": "Form Responses 1",
                        "gridProperties": {
                            "rowCount": 1000,
                            "columnCount": 12,
                            "frozenRowCount": 1
                        }
                    }
                },
                {
                    "properties": {
                        "sheetId": 981472,
                        "title": "Notes",
                        "gridProperties": {"rowCount": 100, "columnCount": 26}
                    }
                }
            ]
        }"#;

        let resp: SpreadsheetResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.sheets.len(), 2);
        let first = &resp.sheets[0].properties;
        assert_eq!(first.title, "Form Responses 1");
        assert_eq!(first.grid_properties.frozen_row_count, 1);
        // frozenRowCount is omitted entirely when zero.
        assert_eq!(resp.sheets[1].properties.grid_properties.frozen_row_count, 0);
    }

    #[test]
    fn test_value_range_deserialization() {
        let json = r#"{
            "range": "'Form Responses 1'!A1:L3",
            "majorDimension": "ROWS",
            "values": [
                ["Timestamp", "Name"],
                ["6/7/2024 9:31:02", "Dana Whitfield"]
            ]
        }"#;

        let resp: ValueRangeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.values.len(), 2);
        assert_eq!(resp.values[1][1], "Dana Whitfield");
    }

    #[test]
    fn test_value_range_empty_sheet_has_no_values_key() {
        let json = r#"{"range": "Empty!A1:Z1000", "majorDimension": "ROWS"}"#;
        let resp: ValueRangeResponse = serde_json::from_str(json).unwrap();
        assert!(resp.values.is_empty());
    }

    #[test]
    fn test_cell_to_string_coerces_non_strings() {
        assert_eq!(cell_to_string(serde_json::json!("text")), "text");
        assert_eq!(cell_to_string(serde_json::json!(42)), "42");
        assert_eq!(cell_to_string(serde_json::json!(true)), "true");
        assert_eq!(cell_to_string(serde_json::Value::Null), "");
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(11), "L");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_row_range_for_write_back() {
        // Row 5 of a 12-column sheet whose title needs quoting.
        assert_eq!(
            row_range("Form Responses 1", 5, 12),
            "'Form Responses 1'!A5:L5"
        );
        assert_eq!(row_range("Data", 2, 3), "Data!A2:C2");
    }

    #[test]
    fn test_cell_ref() {
        assert_eq!(cell_ref("Data", 12, 0), "Data!M1");
        assert_eq!(cell_ref("Form Responses 1", 0, 0), "'Form Responses 1'!A1");
    }

    #[test]
    fn test_quote_sheet_title_escapes_quotes() {
        assert_eq!(quote_sheet_title("Dana's tab"), "'Dana''s tab'");
        assert_eq!(quote_sheet_title("Sheet1"), "Sheet1");
    }

    #[test]
    fn test_validation_request_shape() {
        let body = validation_request(7, 10, 1, &["Approved", "Not approved"]);
        let req = &body["requests"][0]["setDataValidation"];

        assert_eq!(req["range"]["sheetId"], 7);
        assert_eq!(req["range"]["startRowIndex"], 1);
        assert_eq!(req["range"]["startColumnIndex"], 10);
        assert_eq!(req["range"]["endColumnIndex"], 11);
        // No endRowIndex: the rule runs to the bottom of the sheet.
        assert!(req["range"].get("endRowIndex").is_none());

        assert_eq!(req["rule"]["condition"]["type"], "ONE_OF_LIST");
        assert_eq!(
            req["rule"]["condition"]["values"][1]["userEnteredValue"],
            "Not approved"
        );
        assert_eq!(req["rule"]["showCustomUi"], true);
    }
}
