//! Hive Memory - Hybrid semantic memory store for the Hive agent platform.
//!
//! This crate provides a persistent, multi-collection document store with:
//! - Exact-key retrieval and metadata-filtered listing
//! - Embedding-based semantic search per collection
//! - Deduplication and relevance-ranked merging across collections
//!
//! ## Architecture
//!
//! ```text
//! Query → Embeddings → per-collection cosine scan ──┐
//!                                                   ├── Merge + Rank → Results
//! Query → Embeddings → per-collection cosine scan ──┘
//! ```
//!
//! One SQLite database per collection under a single persist directory;
//! the collection set (conversations, projects, employees, knowledge,
//! agent outputs) is fixed at store construction.

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod embeddings;
pub mod error;
pub mod index;
pub mod manager;
pub mod registry;
pub mod store;
pub mod types;
pub mod vector;

// Re-export commonly used types
pub use config::{EmbeddingConfig, MemoryConfig};
pub use embeddings::{create_embedding_provider, EmbeddingProvider, NoopEmbedding, OpenAiEmbedding};
pub use error::{Error, Result};
pub use index::VectorIndex;
pub use manager::StoreManager;
pub use registry::{
    collection_specs, CollectionRegistry, CollectionSpec, SimilarityMetric, AGENT_OUTPUTS,
    COLLECTION_NAMES, CONVERSATIONS, EMPLOYEES, KNOWLEDGE, PROJECTS,
};
pub use store::{
    CollectionExport, CollectionHealth, ExportRecord, HealthReport, HealthStatus, MemoryStore,
};
pub use types::{Document, MetadataFilter, MetadataMap, MetadataValue, SearchHit};
pub use vector::{bytes_to_vec, cosine_similarity, merge_ranked, vec_to_bytes};
