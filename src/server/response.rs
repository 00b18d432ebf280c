//! JSON bodies of the HTTP surface.
//!
//! Field names are camelCase on the wire; the German messages are part of
//! the public contract that existing clients match on.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::HausaufgabenError;
use crate::types::Document;

pub(crate) const NOT_FOUND_MESSAGE: &str = "Keine Hausaufgaben gefunden";
pub(crate) const NOT_FOUND_TODAY_MESSAGE: &str = "Keine Hausaufgaben für heute gefunden";
pub(crate) const UNKNOWN_ENDPOINT_MESSAGE: &str = "Endpoint nicht gefunden";
pub(crate) const INTERNAL_ERROR_MESSAGE: &str = "Interner Serverfehler";

/// `2024-05-06T08:00:00.000Z`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `"12 Sekunden"`; sub-second remainders are dropped.
pub fn format_cache_age(age: std::time::Duration) -> String {
    format!("{} Sekunden", age.as_secs())
}

/// `GET /`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootResponse {
    pub message: String,
    pub version: String,
    pub endpoints: Vec<String>,
    pub last_data_update: String,
}

/// `GET /health`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub data_status: DataStatus,
    pub last_data_fetch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataStatus {
    #[serde(rename = "Loaded")]
    Loaded,
    #[serde(rename = "Not loaded")]
    NotLoaded,
}

/// Successful data read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataResponse {
    pub success: bool,
    pub data: Document,
    /// When the served document was fetched from the backend.
    pub timestamp: String,
    pub source: String,
    pub cached: bool,
    pub cache_age: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Cached "no such document" answer.
#[derive(Debug, Clone, Serialize)]
pub struct NotFoundResponse {
    pub success: bool,
    pub error: &'static str,
    /// When the backend reported the document missing.
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<&'static str>,
}

/// Unmatched path.
#[derive(Debug, Clone, Serialize)]
pub struct UnknownEndpointResponse {
    pub success: bool,
    pub error: &'static str,
    pub path: String,
}

/// Error body for failed requests.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub timestamp: String,
}

/// A failed request: status code plus [`ErrorBody`].
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    /// Generic 500 that reveals nothing about the cause.
    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                success: false,
                error: INTERNAL_ERROR_MESSAGE.to_string(),
                code: None,
                timestamp: format_timestamp(Utc::now()),
            },
        }
    }
}

impl From<HausaufgabenError> for ApiError {
    fn from(err: HausaufgabenError) -> Self {
        // Backend failures are reported with their message; anything else
        // is an internal fault.
        if !err.is_backend() {
            return Self::internal();
        }
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: ErrorBody {
                success: false,
                code: err.code().map(str::to_owned),
                error: err.to_string(),
                timestamp: format_timestamp(Utc::now()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// JSON response with the browser-cache suppression headers used by all
/// data endpoints.
pub fn no_store(status: StatusCode, body: impl IntoResponse) -> Response {
    let mut response = (status, body).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}
