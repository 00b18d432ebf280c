//! Document and fetch result types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single backend record: field name → JSON value, in backend order.
pub type Document = Map<String, Value>;

/// Identifies the one record this service republishes.
///
/// Table-based backends read the single row of `collection`; document
/// stores read `collection/id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef {
    pub collection: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl DocumentRef {
    /// Reference a table (or collection) without a document id.
    pub fn table(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: None,
        }
    }

    /// Reference `collection/id`.
    pub fn document(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: Some(id.into()),
        }
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}/{}", self.collection, id),
            None => f.write_str(&self.collection),
        }
    }
}

/// Successful outcome of a backend read.
///
/// A missing record is not an error: it is cached like a found one.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Document),
    NotFound,
}

impl FetchOutcome {
    /// The document, if one was found.
    pub fn into_document(self) -> Option<Document> {
        match self {
            FetchOutcome::Found(doc) => Some(doc),
            FetchOutcome::NotFound => None,
        }
    }
}
