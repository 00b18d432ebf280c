//! Document cache.
//!
//! - [`CacheEntry`]: the slot's contents: last fetched document (or a
//!   confirmed "not found") and when it was fetched.
//! - [`DocumentCache`]: owns the slot and the backend, implements the
//!   read-through refresh and the status-endpoint [`RefreshPolicy`].
//!
//! The freshness window is [`CACHE_DURATION`] (30 seconds, inclusive).

mod entry;
mod store;

pub use entry::{CACHE_DURATION, CacheEntry, CacheStatus};
pub use store::{CacheConfig, CacheRead, DocumentCache, RefreshPolicy};
