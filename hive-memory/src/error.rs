//! Error types for the Hive memory store.

use thiserror::Error;

/// Result type alias using the memory store error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for memory store operations.
///
/// Every failure names the collection and operation it came from so callers
/// never see an unlabeled error.
#[derive(Error, Debug)]
pub enum Error {
    /// Store construction failed. The store is never returned partially
    /// initialized; callers must retry or abort.
    #[error("memory store initialization failed: {0}")]
    Init(String),

    /// A single store operation failed against one collection.
    #[error("{operation} failed on collection '{collection}': {cause}")]
    Collection {
        collection: String,
        operation: String,
        cause: String,
    },

    /// The embedding engine failed to produce a vector.
    #[error("embedding failed for collection '{collection}': {cause}")]
    Embedding { collection: String, cause: String },

    /// A collection name outside the fixed set was requested.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a labeled operation error for a collection.
    pub fn collection(
        collection: impl Into<String>,
        operation: impl Into<String>,
        cause: impl std::fmt::Display,
    ) -> Self {
        Self::Collection {
            collection: collection.into(),
            operation: operation.into(),
            cause: cause.to_string(),
        }
    }

    /// Build an embedding failure labeled with the collection it hit.
    pub fn embedding(collection: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Embedding {
            collection: collection.into(),
            cause: cause.to_string(),
        }
    }

    /// Check if this is a construction failure.
    pub const fn is_init(&self) -> bool {
        matches!(self, Self::Init(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_error_names_operation_and_collection() {
        let err = Error::collection("knowledge", "upsert", "disk full");
        let msg = err.to_string();
        assert!(msg.contains("knowledge"));
        assert!(msg.contains("upsert"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn embedding_error_names_collection() {
        let err = Error::embedding("conversations", "provider timeout");
        assert!(err.to_string().contains("conversations"));
        assert!(err.to_string().contains("provider timeout"));
    }

    #[test]
    fn init_error_is_init() {
        assert!(Error::Init("bad path".into()).is_init());
        assert!(!Error::UnknownCollection("x".into()).is_init());
    }
}
