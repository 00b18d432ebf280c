//! HTTP handlers and router.

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use chrono::{Local, Utc};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use super::response::{
    ApiError, DataResponse, DataStatus, HealthResponse, NOT_FOUND_MESSAGE,
    NOT_FOUND_TODAY_MESSAGE, NotFoundResponse, RootResponse, UNKNOWN_ENDPOINT_MESSAGE,
    UnknownEndpointResponse, format_cache_age, format_timestamp, no_store,
};
use crate::cache::{CacheRead, DocumentCache};
use crate::projection::render_text;
use crate::version;

/// Shared handler state.
pub struct AppState {
    pub cache: DocumentCache,
    /// Value of the `source` field in data responses.
    pub source: String,
}

impl AppState {
    pub fn new(cache: DocumentCache, source: impl Into<String>) -> Self {
        Self {
            cache,
            source: source.into(),
        }
    }
}

const ENDPOINTS: &[&str] = &[
    "/api/hausaufgaben - Alle Hausaufgaben",
    "/api/hausaufgaben/today - Heutige Hausaufgaben",
    "/api/hausaufgaben/text - Hausaufgaben als Text",
    "/health - Server Status",
];

/// Build the service router. Every path is registered once.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/hausaufgaben", get(hausaufgaben))
        .route("/api/hausaufgaben/today", get(hausaufgaben_today))
        .route("/api/hausaufgaben/text", get(hausaufgaben_text))
        .fallback(unknown_endpoint)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(CatchPanicLayer::custom(panic_response))
}

/// GET / - service overview
async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    let entry = state.cache.touch_for_status().await;
    Json(RootResponse {
        message: "Hausaufgaben API für Chatbase läuft".to_string(),
        version: version::version_string(),
        endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        last_data_update: entry
            .fetched_at_utc()
            .map(format_timestamp)
            .unwrap_or_else(|| "Noch nicht geladen".to_string()),
    })
}

/// GET /health - liveness plus cache state
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let entry = state.cache.touch_for_status().await;
    Json(HealthResponse {
        status: "OK",
        timestamp: format_timestamp(Utc::now()),
        data_status: if entry.document().is_some() {
            DataStatus::Loaded
        } else {
            DataStatus::NotLoaded
        },
        last_data_fetch: entry
            .fetched_at_utc()
            .map(format_timestamp)
            .unwrap_or_else(|| "Never".to_string()),
    })
}

/// GET /api/hausaufgaben - the whole document
async fn hausaufgaben(State(state): State<Arc<AppState>>) -> Response {
    match state.cache.read_through().await {
        Ok(read) => data_response(&state, read, None),
        Err(e) => no_store_error(ApiError::from(e)),
    }
}

/// GET /api/hausaufgaben/today - the document tagged with today's date
async fn hausaufgaben_today(State(state): State<Arc<AppState>>) -> Response {
    match state.cache.read_through().await {
        Ok(read) => {
            let date = Local::now().format("%-d.%-m.%Y").to_string();
            data_response(&state, read, Some(date))
        }
        Err(e) => no_store_error(ApiError::from(e)),
    }
}

/// GET /api/hausaufgaben/text - `key: value` lines
async fn hausaufgaben_text(State(state): State<Arc<AppState>>) -> Response {
    match state.cache.read_through().await {
        Ok(read) => match read.entry.document() {
            Some(document) => render_text(document).into_response(),
            None => (StatusCode::NOT_FOUND, format!("{NOT_FOUND_MESSAGE}\n")).into_response(),
        },
        Err(e) => {
            let err = ApiError::from(e);
            (err.status, format!("{}\n", err.body.error)).into_response()
        }
    }
}

async fn unknown_endpoint(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(UnknownEndpointResponse {
            success: false,
            error: UNKNOWN_ENDPOINT_MESSAGE,
            path: uri.path().to_string(),
        }),
    )
}

/// Build the 200/404 answer for a read. `today` switches on the
/// `filter`/`date` fields of the today endpoint.
fn data_response(state: &AppState, read: CacheRead, today: Option<String>) -> Response {
    let CacheRead { entry, cached, age } = read;
    let timestamp = entry
        .fetched_at_utc()
        .map(format_timestamp)
        .unwrap_or_else(|| format_timestamp(Utc::now()));
    let filter = today.as_ref().map(|_| "today");

    match entry.document() {
        Some(document) => no_store(
            StatusCode::OK,
            Json(DataResponse {
                success: true,
                data: document.clone(),
                timestamp,
                source: state.source.clone(),
                cached,
                cache_age: format_cache_age(age),
                filter,
                date: today,
            }),
        ),
        None => no_store(
            StatusCode::NOT_FOUND,
            Json(NotFoundResponse {
                success: false,
                error: if filter.is_some() {
                    NOT_FOUND_TODAY_MESSAGE
                } else {
                    NOT_FOUND_MESSAGE
                },
                timestamp,
                filter,
            }),
        ),
    }
}

fn no_store_error(err: ApiError) -> Response {
    no_store(err.status, Json(err.body))
}

fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");
    ApiError::internal().into_response()
}
