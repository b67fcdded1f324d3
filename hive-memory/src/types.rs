//! Core document and metadata types for the memory store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single metadata value.
///
/// Metadata bags stay flat: lists and mappings are stored as string-encoded
/// JSON under the `Encoded` variant so every value round-trips through
/// export/import without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataValue {
    /// Plain string value
    Str(String),
    /// Numeric value (integers are widened to f64)
    Num(f64),
    /// Boolean flag
    Bool(bool),
    /// String-encoded JSON for structured values
    Encoded(String),
}

impl MetadataValue {
    /// Encode a structured value (list or mapping) as flat JSON text.
    pub fn encode<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(Self::Encoded(serde_json::to_string(value)?))
    }

    /// Decode an `Encoded` value back into a structured type.
    ///
    /// Returns `None` for non-encoded variants.
    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        match self {
            Self::Encoded(json) => serde_json::from_str(json).ok(),
            _ => None,
        }
    }

    /// View as a string, if this is a `Str` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// View as a number, if this is a `Num` value.
    pub fn as_num(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// View as a boolean, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<f64> for MetadataValue {
    fn from(n: f64) -> Self {
        Self::Num(n)
    }
}

impl From<i64> for MetadataValue {
    fn from(n: i64) -> Self {
        Self::Num(n as f64)
    }
}

impl From<usize> for MetadataValue {
    fn from(n: usize) -> Self {
        Self::Num(n as f64)
    }
}

impl From<bool> for MetadataValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Flat metadata bag attached to every document.
///
/// `BTreeMap` keeps key order deterministic for export and tests.
pub type MetadataMap = BTreeMap<String, MetadataValue>;

/// The unit of storage: id, text content, and a flat metadata bag.
///
/// Identity is the pair (collection, id); ids are caller-supplied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique id within its collection
    pub id: String,
    /// The stored text, also the input to the embedding engine
    pub content: String,
    /// Flat metadata bag
    #[serde(default)]
    pub metadata: MetadataMap,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
    /// Last update timestamp (Unix millis)
    pub updated_at: i64,
}

impl Document {
    /// Create a new document stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        metadata: MetadataMap,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: id.into(),
            content: content.into(),
            metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A semantic search result: the document plus its similarity score.
///
/// Similarity is always in `[0, 1]`, 1 meaning an identical match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub similarity: f32,
}

/// Equality-only predicate over document metadata.
///
/// Matches when every clause equals the corresponding metadata field.
/// Range and inequality matching are intentionally not supported.
#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    clauses: Vec<(String, MetadataValue)>,
}

impl MetadataFilter {
    /// Empty filter matching every document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality clause.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<MetadataValue>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    /// True when no clauses are present.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Evaluate the filter against a metadata bag.
    pub fn matches(&self, metadata: &MetadataMap) -> bool {
        self.clauses
            .iter()
            .all(|(field, value)| metadata.get(field) == Some(value))
    }
}
