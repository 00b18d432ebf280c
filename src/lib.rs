//! Hausaufgaben - cached HTTP façade for a single homework document
//!
//! The crate reads one record from a managed document store (Supabase or
//! Cloud Firestore), keeps it in a 30-second read-through cache and serves
//! it as JSON or plain text.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use hausaufgaben::backend::SupabaseClient;
//! use hausaufgaben::cache::{CacheConfig, DocumentCache};
//! use hausaufgaben::types::DocumentRef;
//!
//! #[tokio::main]
//! async fn main() -> hausaufgaben::Result<()> {
//!     let backend = SupabaseClient::new("https://xyz.supabase.co", "anon-key")?;
//!     let cache = DocumentCache::new(
//!         Arc::new(backend),
//!         DocumentRef::table("Hausaufgaben"),
//!         CacheConfig::default(),
//!     );
//!
//!     let read = cache.read_through().await?;
//!     println!("cached: {}, document: {:?}", read.cached, read.entry.document());
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cache;
pub mod error;
pub mod projection;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use backend::DocumentBackend;
pub use cache::{CacheEntry, DocumentCache};
pub use error::{HausaufgabenError, Result};
pub use types::{Document, DocumentRef, FetchOutcome};
pub use version::{PKG_VERSION, version_string};
