//! Public types for the Hausaufgaben API.

mod document;

pub use document::{Document, DocumentRef, FetchOutcome};
