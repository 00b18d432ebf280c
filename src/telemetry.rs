//! Telemetry metric name constants.
//!
//! Centralised metric names for the document cache. Embedders install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `hausaufgaben_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `backend`: document store name ("supabase", "firestore")
//! - `outcome`: fetch result: "found", "not_found" or "error"

/// Reads answered from the cache slot without a backend call.
pub const CACHE_HITS_TOTAL: &str = "hausaufgaben_cache_hits_total";

/// Reads that found the slot empty or stale.
pub const CACHE_MISSES_TOTAL: &str = "hausaufgaben_cache_misses_total";

/// Backend reads issued by a refresh.
///
/// Labels: `backend`, `outcome`.
pub const BACKEND_FETCHES_TOTAL: &str = "hausaufgaben_backend_fetches_total";

/// Backend read duration in seconds.
///
/// Labels: `backend`.
pub const BACKEND_FETCH_DURATION_SECONDS: &str = "hausaufgaben_backend_fetch_duration_seconds";
