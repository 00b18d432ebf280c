//! The document store capability.
//!
//! The cache core only ever sees a [`DocumentBackend`]; which store sits
//! behind it is decided at wiring time. Implementations return
//! [`FetchOutcome::NotFound`] for a missing record and reserve `Err` for
//! connectivity, authentication and protocol failures.

use async_trait::async_trait;

use crate::Result;
use crate::types::{DocumentRef, FetchOutcome};

/// A backend able to read one document.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Backend name for logging, metrics and the `source` response field.
    fn name(&self) -> &str;

    /// Perform a single network read of `doc`.
    async fn fetch_document(&self, doc: &DocumentRef) -> Result<FetchOutcome>;
}
