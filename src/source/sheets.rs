//! Google Sheets source
//!
//! Fetches a range through the Sheets v4 `values.get` endpoint and flattens the
//! `ValueRange` response into string rows.

use crate::error::ComputeError;
use log::debug;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use super::{RawRows, TabularSource};

/// Default API root
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// Environment variable holding an OAuth bearer token
pub const TOKEN_ENV: &str = "REHAB_SHEETS_TOKEN";

/// Environment variable holding an API key
pub const API_KEY_ENV: &str = "REHAB_SHEETS_API_KEY";

/// Credentials presented to the Sheets API
#[derive(Clone)]
pub enum SheetsAuth {
    BearerToken(String),
    ApiKey(String),
}

impl SheetsAuth {
    /// Read credentials from the environment, preferring a bearer token
    pub fn from_env() -> Result<Self, ComputeError> {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                return Ok(SheetsAuth::BearerToken(token.trim().to_string()));
            }
        }
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Ok(SheetsAuth::ApiKey(key.trim().to_string()));
            }
        }
        Err(ComputeError::InvalidConfig(format!(
            "set {} or {} to read from Google Sheets",
            TOKEN_ENV, API_KEY_ENV
        )))
    }
}

// Credentials never appear in logs or debug output
impl std::fmt::Debug for SheetsAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetsAuth::BearerToken(_) => f.write_str("BearerToken(***)"),
            SheetsAuth::ApiKey(_) => f.write_str("ApiKey(***)"),
        }
    }
}

/// One spreadsheet reachable through the Sheets API
#[derive(Debug, Clone)]
pub struct SheetsSource {
    client: Client,
    base_url: String,
    spreadsheet_id: String,
    auth: SheetsAuth,
}

impl SheetsSource {
    pub fn new(spreadsheet_id: impl Into<String>, auth: SheetsAuth) -> Self {
        Self::with_base_url(SHEETS_API_BASE, spreadsheet_id, auth)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        auth: SheetsAuth,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            spreadsheet_id: spreadsheet_id.into(),
            auth,
        }
    }

    /// URL of `values.get` for `range`, with every segment percent-encoded
    pub fn values_url(&self, range: &str) -> Result<Url, ComputeError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ComputeError::InvalidConfig(format!("invalid Sheets base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                ComputeError::InvalidConfig("Sheets base URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    /// Flatten a `ValueRange` JSON body into string rows
    pub fn parse_value_range(json: &str) -> Result<RawRows, ComputeError> {
        let value_range: ValueRange = serde_json::from_str(json)?;
        Ok(value_range.into_rows())
    }
}

impl TabularSource for SheetsSource {
    fn id(&self) -> String {
        format!("sheets:{}", self.spreadsheet_id)
    }

    fn fetch(&self, range: &str) -> Result<RawRows, ComputeError> {
        let url = self.values_url(range)?;
        debug!("fetching sheet range {} from {}", range, self.spreadsheet_id);

        let request = match &self.auth {
            SheetsAuth::BearerToken(token) => self.client.get(url).bearer_auth(token),
            SheetsAuth::ApiKey(key) => self.client.get(url).query(&[("key", key)]),
        };

        let value_range: ValueRange = request.send()?.error_for_status()?.json()?;
        Ok(value_range.into_rows())
    }
}

// Sheets API response structures

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange {
    #[allow(dead_code)]
    range: Option<String>,
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    fn into_rows(self) -> RawRows {
        self.values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect()
    }
}

/// Formatted values arrive as strings; unformatted ones may be numbers or booleans
fn cell_to_string(cell: serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
