//! Hausaufgaben error types

/// Hausaufgaben error types
#[derive(Debug, thiserror::Error)]
pub enum HausaufgabenError {
    // Backend/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success answer from the document store.
    ///
    /// `code` carries the backend's own error code when the response body
    /// had one (PostgREST `PGRST…` codes, Google RPC status names).
    #[error("backend error ({status}): {message}")]
    Backend {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("authentication with the document store failed")]
    AuthenticationFailed,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("missing configuration values: {}", .0.join(", "))]
    MissingConfiguration(Vec<String>),
}

impl HausaufgabenError {
    /// Backend-specific error code, if the store reported one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether this error comes from talking to the backend (as opposed to
    /// local configuration).
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Self::Http(_)
                | Self::Backend { .. }
                | Self::AuthenticationFailed
                | Self::Json(_)
                | Self::InvalidDocument(_)
        )
    }
}

impl From<reqwest::Error> for HausaufgabenError {
    fn from(err: reqwest::Error) -> Self {
        HausaufgabenError::Http(err.to_string())
    }
}

/// Result type alias for Hausaufgaben operations
pub type Result<T> = std::result::Result<T, HausaufgabenError>;
