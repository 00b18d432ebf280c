//! Read-through document cache.
//!
//! [`DocumentCache`] owns the single cache slot together with the backend
//! that fills it. Handlers receive it through shared state; there is no
//! process global.
//!
//! # Refresh coalescing
//!
//! With [`CacheConfig::coalesce_refreshes`] enabled (the default), stale
//! readers queue on a refresh gate. Each refresh that writes the slot
//! advances its generation; a reader that gets through the gate and sees a newer
//! generation than the one it found stale takes that result instead of
//! calling the backend again. A failed refresh does not bump the
//! generation, so the next queued reader retries.
//!
//! With coalescing disabled, every stale reader issues its own backend
//! call.
//!
//! # Write ordering
//!
//! Every refresh draws a ticket before it calls the backend, and the slot
//! records the ticket of the fetch that wrote it. A fetch only writes if its
//! ticket is newer than the slot's, so a slow refresh that finishes after a
//! later-started one is discarded instead of overwriting newer contents.
//! The slot's ticket doubles as the generation the coalescing check reads.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::entry::{CACHE_DURATION, CacheEntry};
use crate::Result;
use crate::backend::DocumentBackend;
use crate::telemetry;
use crate::types::{DocumentRef, FetchOutcome};

/// When status endpoints (root, health) touch the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPolicy {
    /// Status endpoints refresh on every request, bypassing the cache.
    #[default]
    Eager,
    /// Status endpoints follow the same freshness check as data endpoints.
    Lazy,
}

/// Configuration for the document cache.
///
/// ```rust
/// # use hausaufgaben::cache::{CacheConfig, RefreshPolicy};
/// let config = CacheConfig::new()
///     .policy(RefreshPolicy::Lazy)
///     .coalesce_refreshes(false);
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Freshness window. Default: [`CACHE_DURATION`] (30s).
    pub ttl: Duration,
    /// Status endpoint policy. Default: eager.
    pub policy: RefreshPolicy,
    /// Share one backend call between concurrent stale readers. Default: true.
    pub coalesce_refreshes: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: CACHE_DURATION,
            policy: RefreshPolicy::default(),
            coalesce_refreshes: true,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, policy: RefreshPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn coalesce_refreshes(mut self, enabled: bool) -> Self {
        self.coalesce_refreshes = enabled;
        self
    }

    /// Override the freshness window.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Result of a read-through lookup.
#[derive(Debug, Clone)]
pub struct CacheRead {
    /// Slot contents the answer is built from.
    pub entry: CacheEntry,
    /// `true` when answered from the slot without a backend call.
    pub cached: bool,
    /// Age of `entry` at answer time.
    pub age: Duration,
}

struct Slot {
    entry: CacheEntry,
    /// Ticket of the fetch that wrote `entry`; 0 before the first write.
    generation: u64,
}

/// Single-document cache with read-through refresh.
pub struct DocumentCache {
    backend: Arc<dyn DocumentBackend>,
    document: DocumentRef,
    config: CacheConfig,
    slot: RwLock<Slot>,
    refresh_gate: Mutex<()>,
    tickets: AtomicU64,
}

impl DocumentCache {
    /// Create an empty cache for `document` served by `backend`.
    pub fn new(
        backend: Arc<dyn DocumentBackend>,
        document: DocumentRef,
        config: CacheConfig,
    ) -> Self {
        Self {
            backend,
            document,
            config,
            slot: RwLock::new(Slot {
                entry: CacheEntry::default(),
                generation: 0,
            }),
            refresh_gate: Mutex::new(()),
            tickets: AtomicU64::new(0),
        }
    }

    /// Name of the backend feeding this cache.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Current slot contents, no side effects.
    pub async fn read(&self) -> CacheEntry {
        self.slot.read().await.entry.clone()
    }

    /// Whether the slot is populated and within the freshness window at `now`.
    pub async fn is_fresh(&self, now: Instant) -> bool {
        self.slot.read().await.entry.is_fresh(now, self.config.ttl)
    }

    /// Fetch the document once and overwrite the slot.
    ///
    /// Found and not-found both replace the slot, unless a refresh that
    /// started later has already written it; then the slot's newer contents
    /// are returned and this fetch is dropped. On error the slot keeps its
    /// previous contents (including its fetch time) and the error is
    /// returned to the caller.
    pub async fn refresh(&self) -> Result<CacheEntry> {
        let backend = self.backend.name();
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(backend, document = %self.document, ticket, "refreshing document");

        let started = Instant::now();
        let result = self.backend.fetch_document(&self.document).await;
        metrics::histogram!(
            telemetry::BACKEND_FETCH_DURATION_SECONDS,
            "backend" => backend.to_owned()
        )
        .record(started.elapsed().as_secs_f64());

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                metrics::counter!(telemetry::BACKEND_FETCHES_TOTAL,
                    "backend" => backend.to_owned(),
                    "outcome" => "error",
                )
                .increment(1);
                warn!(
                    backend,
                    document = %self.document,
                    error = %e,
                    "refresh failed, keeping cached contents"
                );
                return Err(e);
            }
        };

        let label = match &outcome {
            FetchOutcome::Found(doc) => {
                info!(
                    backend,
                    document = %self.document,
                    fields = doc.len(),
                    "document refreshed"
                );
                "found"
            }
            FetchOutcome::NotFound => {
                warn!(backend, document = %self.document, "document not found");
                "not_found"
            }
        };
        metrics::counter!(telemetry::BACKEND_FETCHES_TOTAL,
            "backend" => backend.to_owned(),
            "outcome" => label,
        )
        .increment(1);

        let entry = CacheEntry::fetched(outcome.into_document(), Instant::now(), Utc::now());
        let mut slot = self.slot.write().await;
        if slot.generation > ticket {
            debug!(
                document = %self.document,
                ticket,
                current = slot.generation,
                "discarding superseded refresh"
            );
            return Ok(slot.entry.clone());
        }
        slot.entry = entry.clone();
        slot.generation = ticket;
        Ok(entry)
    }

    /// Answer from the slot if fresh, otherwise refresh first.
    ///
    /// `cached` in the result is judged against the instant the request
    /// arrived, before any refresh, so a response produced by a refresh is
    /// never reported as cached.
    pub async fn read_through(&self) -> Result<CacheRead> {
        let now = Instant::now();
        let generation = {
            let slot = self.slot.read().await;
            if slot.entry.is_fresh(now, self.config.ttl) {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                debug!(document = %self.document, "serving cached document");
                return Ok(CacheRead {
                    age: slot.entry.age(now).unwrap_or_default(),
                    entry: slot.entry.clone(),
                    cached: true,
                });
            }
            slot.generation
        };

        metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        debug!(document = %self.document, "cache empty or expired, loading");

        let entry = self.refresh_after(generation).await?;
        Ok(CacheRead {
            age: entry.age(Instant::now()).unwrap_or_default(),
            entry,
            cached: false,
        })
    }

    /// Hook for root and health endpoints.
    ///
    /// Eager policy refreshes regardless of freshness, lazy policy defers
    /// to [`read_through`](Self::read_through). An eager refresh still
    /// queues on the refresh gate, so it shares a backend call with any
    /// refresh already in flight. Errors are logged and swallowed; the
    /// caller reports whatever the slot holds afterwards.
    pub async fn touch_for_status(&self) -> CacheEntry {
        let result = match self.config.policy {
            RefreshPolicy::Eager => {
                let generation = self.slot.read().await.generation;
                self.refresh_after(generation).await.map(|_| ())
            }
            RefreshPolicy::Lazy => self.read_through().await.map(|_| ()),
        };
        if let Err(e) = result {
            debug!(error = %e, "status refresh failed");
        }
        self.read().await
    }

    /// Refresh unless another caller already did so since `generation`.
    async fn refresh_after(&self, generation: u64) -> Result<CacheEntry> {
        if !self.config.coalesce_refreshes {
            return self.refresh().await;
        }

        let _gate = self.refresh_gate.lock().await;
        {
            let slot = self.slot.read().await;
            if slot.generation != generation {
                debug!(document = %self.document, "reusing concurrent refresh");
                return Ok(slot.entry.clone());
            }
        }
        self.refresh().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_config_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(30));
        assert_eq!(config.policy, RefreshPolicy::Eager);
        assert!(config.coalesce_refreshes);
    }

    #[test]
    fn cache_config_builder() {
        let config = CacheConfig::new()
            .policy(RefreshPolicy::Lazy)
            .coalesce_refreshes(false)
            .ttl(Duration::from_secs(5));
        assert_eq!(config.policy, RefreshPolicy::Lazy);
        assert!(!config.coalesce_refreshes);
        assert_eq!(config.ttl, Duration::from_secs(5));
    }

    #[test]
    fn refresh_policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: RefreshPolicy,
        }
        let w: Wrapper = serde_json::from_str(r#"{"policy": "lazy"}"#).unwrap();
        assert_eq!(w.policy, RefreshPolicy::Lazy);
    }
}
