//! Google Sheets HTTP client.

use std::time::Duration;

use avgmove_core::{CellValue, Grid};
use serde::Deserialize;
use url::Url;

use crate::auth::Credentials;

const USER_AGENT: &str = concat!("avgmove/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 30;

/// Sheets API client (blocking).
pub struct SheetsClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: Option<String>,
    creds: Option<Credentials>,
    token_uri: String,
}

/// Error type for Sheets operations.
#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// No usable credentials
    #[error("missing Google credentials: {0}")]
    NotAuthenticated(String),
    /// OAuth refresh-token exchange failed
    #[error("Google token refresh failed: {0}")]
    TokenRefresh(String),
    /// 401/403 from the API
    #[error("Google Sheets auth failed ({0}): {1}")]
    Auth(u16, String),
    /// 404: unknown spreadsheet, sheet or range
    #[error("Google Sheets not found: {0}")]
    NotFound(String),
    /// Other 4xx: the request itself was rejected
    #[error("Google Sheets request rejected ({0}): {1}")]
    Validation(u16, String),
    /// 5xx and 429
    #[error("Google Sheets error ({0}): {1}")]
    Http(u16, String),
    /// Transport failure (DNS, connect, timeout)
    #[error("network error: {0}")]
    Network(String),
    /// Unexpected response body
    #[error("unexpected Google Sheets response: {0}")]
    Parse(String),
    /// Bad `sheets.apiBase`
    #[error("invalid API base URL {0:?}")]
    InvalidUrl(String),
}

/// Summary returned by `values.update`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateResponse {
    pub spreadsheet_id: String,
    pub updated_range: String,
    pub updated_rows: u64,
    pub updated_columns: u64,
    pub updated_cells: u64,
}

impl SheetsClient {
    /// Client that sends `token` as-is.
    pub fn with_access_token(api_base: impl Into<String>, token: impl Into<String>) -> Result<Self, SheetsError> {
        let token = token.into().trim().to_string();
        if token.is_empty() {
            return Err(SheetsError::NotAuthenticated("access token is empty".into()));
        }
        Ok(Self {
            http: build_http()?,
            api_base: api_base.into(),
            token: Some(token),
            creds: None,
            token_uri: String::new(),
        })
    }

    /// Client that fetches a token from `creds` on first use.
    pub fn from_credentials(
        api_base: impl Into<String>,
        creds: impl Into<Credentials>,
        token_uri: impl Into<String>,
    ) -> Result<Self, SheetsError> {
        Ok(Self {
            http: build_http()?,
            api_base: api_base.into(),
            token: None,
            creds: Some(creds.into()),
            token_uri: token_uri.into(),
        })
    }

    fn access_token(&mut self) -> Result<String, SheetsError> {
        if let Some(token) = &self.token {
            return Ok(token.clone());
        }
        let creds = self
            .creds
            .as_ref()
            .ok_or_else(|| SheetsError::NotAuthenticated("no access token or credentials".into()))?;
        let token = creds.fetch_access_token(&self.http, &self.token_uri)?;
        self.token = Some(token.clone());
        Ok(token)
    }

    /// Fetch spreadsheet metadata; used as a reachability check.
    pub fn get_spreadsheet(&mut self, spreadsheet_id: &str) -> Result<serde_json::Value, SheetsError> {
        let url = self.spreadsheet_url(spreadsheet_id, &[])?;
        let token = self.access_token()?;
        let req = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "spreadsheetId")]);
        send(req)
    }

    /// Read `range` (A1 notation) as rows of raw values.
    pub fn get_values(&mut self, spreadsheet_id: &str, range: &str) -> Result<Grid, SheetsError> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        let token = self.access_token()?;
        let req = self.http.get(url).bearer_auth(token).query(&[
            ("majorDimension", "ROWS"),
            ("valueRenderOption", "UNFORMATTED_VALUE"),
        ]);
        let body = send(req)?;

        match &body["values"] {
            serde_json::Value::Null => Ok(Grid::default()),
            serde_json::Value::Array(rows) => Ok(Grid::from_json_rows(rows)),
            other => Err(SheetsError::Parse(format!("values is not an array: {}", other))),
        }
    }

    /// Overwrite `range` with `rows`, stored exactly as given (RAW).
    pub fn update_values(
        &mut self,
        spreadsheet_id: &str,
        range: &str,
        rows: &[Vec<CellValue>],
    ) -> Result<UpdateResponse, SheetsError> {
        let url = self.spreadsheet_url(spreadsheet_id, &["values", range])?;
        let token = self.access_token()?;
        let body = serde_json::json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": rows,
        });
        let req = self
            .http
            .put(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body);
        let resp = send(req)?;
        serde_json::from_value(resp).map_err(|e| SheetsError::Parse(e.to_string()))
    }

    /// `{api_base}/v4/spreadsheets/{id}/{tail...}` with each segment percent-encoded.
    pub(crate) fn spreadsheet_url(&self, spreadsheet_id: &str, tail: &[&str]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.api_base).map_err(|_| SheetsError::InvalidUrl(self.api_base.clone()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| SheetsError::InvalidUrl(self.api_base.clone()))?;
            segments.pop_if_empty().push("v4").push("spreadsheets").push(spreadsheet_id);
            for segment in tail {
                segments.push(segment);
            }
        }
        Ok(url)
    }
}

fn build_http() -> Result<reqwest::blocking::Client, SheetsError> {
    reqwest::blocking::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
        .map_err(|e| SheetsError::Network(format!("failed to build HTTP client: {}", e)))
}

/// Send once and classify the response.
fn send(req: reqwest::blocking::RequestBuilder) -> Result<serde_json::Value, SheetsError> {
    let resp = req.send().map_err(|e| SheetsError::Network(e.to_string()))?;
    let status = resp.status().as_u16();

    if !resp.status().is_success() {
        let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
        let msg = extract_google_error(&body, status);
        return Err(match status {
            401 | 403 => SheetsError::Auth(status, msg),
            404 => SheetsError::NotFound(msg),
            429 => SheetsError::Http(status, msg),
            400..=499 => SheetsError::Validation(status, msg),
            _ => SheetsError::Http(status, msg),
        });
    }

    let text = resp.text().map_err(|e| SheetsError::Network(e.to_string()))?;
    let trimmed = text.trim_start_matches('\u{feff}').trim();
    if trimmed.is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(trimmed).map_err(|e| {
        let excerpt: String = trimmed.chars().take(200).collect();
        SheetsError::Parse(format!("{} (body: {})", e, excerpt))
    })
}

/// Google wraps errors as `{"error": {"code", "message", "status"}}`.
fn extract_google_error(body: &serde_json::Value, status: u16) -> String {
    body["error"]["message"]
        .as_str()
        .or_else(|| body["error_description"].as_str())
        .or_else(|| body["error"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}
