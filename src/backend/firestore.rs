//! Cloud Firestore REST client.
//!
//! Reads one document with the project's web API key and flattens
//! Firestore's typed value encoding into plain JSON.
//! See: <https://firebase.google.com/docs/firestore/reference/rest/v1/projects.databases.documents/get>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tracing::debug;

use super::traits::DocumentBackend;
use crate::types::{Document, DocumentRef, FetchOutcome};
use crate::{HausaufgabenError, Result};

/// Default base URL for the Firestore REST API
pub(crate) const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";

/// Google RPC status reported for a 404.
const NOT_FOUND_CODE: &str = "NOT_FOUND";

/// Client for one Firebase project's default Firestore database.
#[derive(Clone)]
pub struct FirestoreClient {
    project_id: String,
    api_key: String,
    http: Client,
    base_url: String,
}

impl FirestoreClient {
    /// Create a client for `project_id` authenticated with the web `api_key`.
    pub fn new(project_id: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(project_id, api_key, DEFAULT_BASE_URL, None)
    }

    /// Create a client with a custom base URL (for testing with wiremock)
    /// and an optional request timeout.
    pub fn with_base_url(
        project_id: impl Into<String>,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
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
            project_id: project_id.into(),
            api_key: api_key.into(),
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn document_url(&self, doc: &DocumentRef) -> Result<String> {
        let id = doc.id.as_deref().ok_or_else(|| {
            HausaufgabenError::Configuration(format!(
                "firestore needs a document id for collection '{}'",
                doc.collection
            ))
        })?;
        Ok(format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url, self.project_id, doc.collection, id
        ))
    }
}

#[async_trait]
impl DocumentBackend for FirestoreClient {
    fn name(&self) -> &str {
        "firestore"
    }

    async fn fetch_document(&self, doc: &DocumentRef) -> Result<FetchOutcome> {
        let url = self.document_url(doc)?;
        debug!(%url, "reading firestore document");

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let raw: RawDocument = serde_json::from_str(&body)?;
            return Ok(FetchOutcome::Found(decode_fields(raw.fields)?));
        }

        let envelope: Option<ErrorEnvelope> = serde_json::from_str(&body).ok();

        // A missing database or project is also a 404; only a message naming
        // the requested document means the record does not exist.
        if status == StatusCode::NOT_FOUND {
            return match envelope {
                Some(ErrorEnvelope { error }) if names_document(&error.message, doc) => {
                    Ok(FetchOutcome::NotFound)
                }
                Some(ErrorEnvelope { error }) => Err(HausaufgabenError::Backend {
                    status: status.as_u16(),
                    message: error.message,
                    code: Some(error.status.unwrap_or_else(|| NOT_FOUND_CODE.to_string())),
                }),
                None => Err(HausaufgabenError::Backend {
                    status: status.as_u16(),
                    message: status.to_string(),
                    code: Some(NOT_FOUND_CODE.to_string()),
                }),
            };
        }

        match envelope {
            Some(ErrorEnvelope { error }) => Err(HausaufgabenError::Backend {
                status: status.as_u16(),
                message: error.message,
                code: error.status,
            }),
            None if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                Err(HausaufgabenError::AuthenticationFailed)
            }
            None => Err(HausaufgabenError::Backend {
                status: status.as_u16(),
                message: status.to_string(),
                code: None,
            }),
        }
    }
}

/// Whether a 404 message (`Document "projects/…/documents/{collection}/{id}" not found.`)
/// refers to `doc` itself.
fn names_document(message: &str, doc: &DocumentRef) -> bool {
    let Some(id) = doc.id.as_deref() else {
        return false;
    };
    message.contains(&format!("/documents/{}/{}\"", doc.collection, id))
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Decode a Firestore `fields` map, keeping the response's field order.
pub(crate) fn decode_fields(fields: Map<String, Value>) -> Result<Document> {
    fields
        .into_iter()
        .map(|(key, value)| decode_value(value).map(|v| (key, v)))
        .collect()
}

/// Decode one typed value (`{"stringValue": "…"}` and friends).
fn decode_value(value: Value) -> Result<Value> {
    let Value::Object(typed) = value else {
        return Err(invalid("field value is not an object"));
    };
    let Some((kind, inner)) = typed.into_iter().next() else {
        return Err(invalid("empty field value"));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue"
        | "bytesValue" | "geoPointValue" => Ok(inner),
        // int64 travels as a decimal string
        "integerValue" => match &inner {
            Value::String(s) => s
                .parse::<i64>()
                .map(|n| Value::Number(Number::from(n)))
                .map_err(|_| invalid(&format!("bad integerValue '{s}'"))),
            Value::Number(_) => Ok(inner),
            _ => Err(invalid("bad integerValue")),
        },
        "arrayValue" => {
            let values = match inner {
                Value::Object(mut array) => match array.remove("values") {
                    Some(Value::Array(values)) => values,
                    _ => Vec::new(),
                },
                _ => return Err(invalid("bad arrayValue")),
            };
            values
                .into_iter()
                .map(decode_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        "mapValue" => match inner {
            Value::Object(mut map) => {
                let fields = match map.remove("fields") {
                    Some(Value::Object(fields)) => fields,
                    _ => Map::new(),
                };
                decode_fields(fields).map(Value::Object)
            }
            _ => Err(invalid("bad mapValue")),
        },
        other => Err(invalid(&format!("unknown value type '{other}'"))),
    }
}

fn invalid(msg: &str) -> HausaufgabenError {
    HausaufgabenError::InvalidDocument(msg.to_string())
}
