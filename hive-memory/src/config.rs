//! Configuration for the memory store.
//!
//! # Priority
//!
//! 1. Explicit values supplied by the caller
//! 2. Environment variables
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `HIVE_MEMORY_DIR` → persist_dir
//! - `HIVE_EMBEDDING_PROVIDER` → embedding.provider
//! - `HIVE_EMBEDDING_MODEL` → embedding.model
//! - `OPENAI_API_KEY` → embedding.api_key

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default persistence directory when nothing is configured.
pub const DEFAULT_PERSIST_DIR: &str = "./data/memory";

/// Env var overriding the persistence directory.
pub const PERSIST_DIR_ENV: &str = "HIVE_MEMORY_DIR";

/// Memory store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Directory holding one database per collection
    #[serde(default = "default_persist_dir")]
    pub persist_dir: PathBuf,

    /// Embedding engine configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            persist_dir: default_persist_dir(),
            embedding: EmbeddingConfig::default(),
        }
    }
}

impl MemoryConfig {
    /// Build a configuration from environment variables over defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var(PERSIST_DIR_ENV) {
            if !dir.is_empty() {
                config.persist_dir = PathBuf::from(dir);
            }
        }

        config.embedding = EmbeddingConfig::from_env();
        config
    }

    /// Override the persistence directory.
    pub fn with_persist_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.persist_dir = dir.into();
        self
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider name: "openai" or "noop"
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier passed to the provider
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; falls back to `OPENAI_API_KEY` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for OpenAI-compatible endpoints
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Vector dimensions produced by the model
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            dimensions: default_dimensions(),
        }
    }
}

impl EmbeddingConfig {
    /// Build an embedding configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(provider) = std::env::var("HIVE_EMBEDDING_PROVIDER") {
            if !provider.is_empty() {
                config.provider = provider;
            }
        }
        if let Ok(model) = std::env::var("HIVE_EMBEDDING_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }

        config
    }
}

fn default_persist_dir() -> PathBuf {
    PathBuf::from(DEFAULT_PERSIST_DIR)
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "text-embedding-3-small".into()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_dimensions() -> usize {
    1536
}
