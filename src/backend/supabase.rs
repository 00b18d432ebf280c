//! Supabase (PostgREST) client.
//!
//! Reads the single row of a table through the REST gateway, asking
//! PostgREST for a singular object so that "no row" comes back as a
//! distinguishable `PGRST116` answer instead of an empty array.
//! See: <https://postgrest.org/en/stable/references/api/resource_representation.html#singular-or-plural>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::traits::DocumentBackend;
use crate::types::{DocumentRef, FetchOutcome};
use crate::{HausaufgabenError, Result};

/// Media type requesting a single JSON object instead of an array.
const SINGULAR_OBJECT: &str = "application/vnd.pgrst.object+json";

/// PostgREST code for "singular response requested, but not exactly one row".
const NOT_SINGULAR: &str = "PGRST116";

/// Client for a Supabase project's REST endpoint.
#[derive(Clone)]
pub struct SupabaseClient {
    api_key: String,
    http: Client,
    base_url: String,
}

impl SupabaseClient {
    /// Create a client for the project at `url` (e.g. `https://xyz.supabase.co`).
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, api_key, None)
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(
        url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(|e| {
            HausaufgabenError::Configuration(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            api_key: api_key.into(),
            http,
            base_url: url.into().trim_end_matches('/').to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[async_trait]
impl DocumentBackend for SupabaseClient {
    fn name(&self) -> &str {
        "supabase"
    }

    async fn fetch_document(&self, doc: &DocumentRef) -> Result<FetchOutcome> {
        let url = self.table_url(&doc.collection);
        debug!(%url, "querying supabase table");

        let response = self
            .http
            .get(&url)
            .query(&[("select", "*")])
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", SINGULAR_OBJECT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return parse_rows(&body);
        }

        let error = PostgrestError::parse(&body);
        if status == StatusCode::NOT_ACCEPTABLE && error.is_zero_rows() {
            return Ok(FetchOutcome::NotFound);
        }
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
            && error.code.is_none()
        {
            return Err(HausaufgabenError::AuthenticationFailed);
        }

        Err(HausaufgabenError::Backend {
            status: status.as_u16(),
            message: error.message.unwrap_or_else(|| status.to_string()),
            code: error.code,
        })
    }
}

/// Interpret a 2xx body: a singular object, or (if the gateway ignored the
/// singular media type) an array that must hold at most one row.
fn parse_rows(body: &str) -> Result<FetchOutcome> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(row) => Ok(FetchOutcome::Found(row)),
        Value::Null => Ok(FetchOutcome::NotFound),
        Value::Array(rows) => {
            let count = rows.len();
            let mut rows = rows.into_iter();
            match (rows.next(), count) {
                (None, _) => Ok(FetchOutcome::NotFound),
                (Some(Value::Object(row)), 1) => Ok(FetchOutcome::Found(row)),
                (Some(_), 1) => Err(HausaufgabenError::InvalidDocument(
                    "row is not a JSON object".to_string(),
                )),
                (Some(_), n) => Err(HausaufgabenError::Backend {
                    status: 406,
                    message: format!("expected a single row, got {n}"),
                    code: Some(NOT_SINGULAR.to_string()),
                }),
            }
        }
        other => Err(HausaufgabenError::InvalidDocument(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// PostgREST error body.
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl PostgrestError {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    /// `PGRST116` is shared by "no rows" and "more than one row"; only the
    /// details string tells them apart.
    fn is_zero_rows(&self) -> bool {
        self.code.as_deref() == Some(NOT_SINGULAR)
            && self
                .details
                .as_deref()
                .is_some_and(|d| d.contains(" 0 rows"))
    }
}
