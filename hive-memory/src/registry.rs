//! Collection registry: the fixed set of named collections and their
//! per-collection vector indices.
//!
//! The collection set is fixed at store construction and never changes at
//! runtime. Construction is eager and fail-fast: if any single collection
//! cannot be initialized, no registry is returned.

use crate::embeddings::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// User and agent conversation history.
pub const CONVERSATIONS: &str = "conversations";
/// Project information and tracking.
pub const PROJECTS: &str = "projects";
/// Employee records and skills.
pub const EMPLOYEES: &str = "employees";
/// Company knowledge base.
pub const KNOWLEDGE: &str = "knowledge";
/// Agent task outputs and artifacts.
pub const AGENT_OUTPUTS: &str = "agent_outputs";

/// All collection names, in registry order.
pub const COLLECTION_NAMES: [&str; 5] =
    [CONVERSATIONS, PROJECTS, EMPLOYEES, KNOWLEDGE, AGENT_OUTPUTS];

/// Similarity metric used by a collection's index.
///
/// Every fixed collection uses cosine over L2-normalized embeddings;
/// reported scores are normalized into `[0, 1]` (see `vector`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    Cosine,
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cosine => write!(f, "cosine"),
        }
    }
}

/// Static description of one collection.
#[derive(Debug, Clone)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub metric: SimilarityMetric,
    pub description: &'static str,
}

/// The fixed collection set, in registry order.
pub fn collection_specs() -> [CollectionSpec; 5] {
    [
        CollectionSpec {
            name: CONVERSATIONS,
            metric: SimilarityMetric::Cosine,
            description: "User and agent conversation history",
        },
        CollectionSpec {
            name: PROJECTS,
            metric: SimilarityMetric::Cosine,
            description: "Project information and tracking",
        },
        CollectionSpec {
            name: EMPLOYEES,
            metric: SimilarityMetric::Cosine,
            description: "Employee records and skills",
        },
        CollectionSpec {
            name: KNOWLEDGE,
            metric: SimilarityMetric::Cosine,
            description: "Company knowledge base",
        },
        CollectionSpec {
            name: AGENT_OUTPUTS,
            metric: SimilarityMetric::Cosine,
            description: "Agent task outputs and artifacts",
        },
    ]
}

/// Owns the fixed mapping from collection name to its vector index.
pub struct CollectionRegistry {
    indices: BTreeMap<&'static str, VectorIndex>,
}

impl CollectionRegistry {
    /// Eagerly open every collection under `dir`.
    pub async fn open(dir: &Path, embedding: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::Init(format!("cannot create directory {}: {e}", dir.display())))?;

        let mut indices = BTreeMap::new();
        for spec in collection_specs() {
            let index = VectorIndex::open(dir, &spec, embedding.clone()).await?;
            indices.insert(spec.name, index);
        }

        Ok(Self { indices })
    }

    /// Look up a collection's index by name.
    pub fn get(&self, name: &str) -> Option<&VectorIndex> {
        self.indices.get(name)
    }

    /// Look up a collection's index, failing on unknown names.
    pub fn index(&self, name: &str) -> Result<&VectorIndex> {
        self.get(name)
            .ok_or_else(|| Error::UnknownCollection(name.to_string()))
    }

    /// Iterate (name, index) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &VectorIndex)> {
        self.indices.iter().map(|(name, index)| (*name, index))
    }

    /// Number of collections.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// True when no collections are registered (never, in practice).
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
