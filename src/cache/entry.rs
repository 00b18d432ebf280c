//! The cache slot's contents.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::types::Document;

/// Freshness window of the slot. An entry exactly this old is still fresh.
pub const CACHE_DURATION: Duration = Duration::from_secs(30);

/// Derived state of the slot at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// No fetch has completed since process start.
    Empty,
    /// Within the freshness window.
    Fresh,
    /// Older than the freshness window.
    Stale,
}

/// Last completed fetch: the document (if it existed) and when it was read.
///
/// Only ever replaced as a whole by a successful refresh. `document` is
/// `None` both before the first fetch and after a fetch that found no
/// record; `fetched_at` tells the two apart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheEntry {
    document: Option<Document>,
    fetched_at: Option<Instant>,
    fetched_at_utc: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Entry for a fetch that completed at `at` (monotonic) / `at_utc` (wall clock).
    pub fn fetched(document: Option<Document>, at: Instant, at_utc: DateTime<Utc>) -> Self {
        Self {
            document,
            fetched_at: Some(at),
            fetched_at_utc: Some(at_utc),
        }
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn fetched_at(&self) -> Option<Instant> {
        self.fetched_at
    }

    /// Wall-clock time of the last fetch, for response timestamps.
    pub fn fetched_at_utc(&self) -> Option<DateTime<Utc>> {
        self.fetched_at_utc
    }

    /// Whether any fetch has completed.
    pub fn is_populated(&self) -> bool {
        self.fetched_at.is_some()
    }

    /// Populated, but the backend reported no record.
    pub fn is_not_found(&self) -> bool {
        self.is_populated() && self.document.is_none()
    }

    /// Time since the last fetch, zero if `now` precedes it.
    pub fn age(&self, now: Instant) -> Option<Duration> {
        self.fetched_at.map(|at| now.saturating_duration_since(at))
    }

    /// `true` iff populated and `now - fetched_at <= ttl`.
    pub fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now).is_some_and(|age| age <= ttl)
    }

    pub fn status(&self, now: Instant, ttl: Duration) -> CacheStatus {
        match self.age(now) {
            None => CacheStatus::Empty,
            Some(age) if age <= ttl => CacheStatus::Fresh,
            Some(_) => CacheStatus::Stale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        serde_json::from_str(r#"{"math": "p.12"}"#).unwrap()
    }

    #[test]
    fn empty_entry() {
        let entry = CacheEntry::default();
        let now = Instant::now();
        assert!(!entry.is_populated());
        assert!(!entry.is_not_found());
        assert!(!entry.is_fresh(now, CACHE_DURATION));
        assert_eq!(entry.status(now, CACHE_DURATION), CacheStatus::Empty);
        assert_eq!(entry.age(now), None);
    }

    #[test]
    fn freshness_boundary_is_inclusive() {
        let t0 = Instant::now();
        let entry = CacheEntry::fetched(Some(doc()), t0, Utc::now());

        assert!(entry.is_fresh(t0, CACHE_DURATION));
        assert!(entry.is_fresh(t0 + Duration::from_millis(30_000), CACHE_DURATION));
        assert!(!entry.is_fresh(t0 + Duration::from_millis(30_001), CACHE_DURATION));
        assert_eq!(
            entry.status(t0 + Duration::from_millis(30_001), CACHE_DURATION),
            CacheStatus::Stale
        );
    }

    #[test]
    fn not_found_is_populated() {
        let entry = CacheEntry::fetched(None, Instant::now(), Utc::now());
        assert!(entry.is_populated());
        assert!(entry.is_not_found());
        assert!(entry.document().is_none());
    }

    #[test]
    fn age_saturates_before_fetch() {
        let t0 = Instant::now();
        let entry = CacheEntry::fetched(None, t0 + Duration::from_secs(5), Utc::now());
        assert_eq!(entry.age(t0), Some(Duration::ZERO));
    }
}
