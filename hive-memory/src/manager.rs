//! Process lifecycle for the shared memory store.
//!
//! `StoreManager` is an explicit context object, not a hidden global: the
//! caller constructs one, passes it around, and uses `get_or_create` /
//! `recreate` as the only entry points. Construction happens under a lock so
//! simultaneous first accesses yield exactly one live instance per
//! persistence path.

use crate::config::MemoryConfig;
use crate::embeddings::{create_embedding_provider, EmbeddingProvider};
use crate::error::{Error, Result};
use crate::store::MemoryStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Two-state lifecycle manager: Uninitialized until first access, Ready
/// afterwards, back to Uninitialized on a forced recreate.
pub struct StoreManager {
    config: MemoryConfig,
    embedding: Arc<dyn EmbeddingProvider>,
    current: Mutex<Option<Arc<MemoryStore>>>,
}

impl StoreManager {
    /// Create a manager, building the embedding provider from configuration.
    pub fn new(config: MemoryConfig) -> Result<Self> {
        let embedding = create_embedding_provider(&config.embedding)
            .map_err(|e| Error::Init(format!("embedding provider: {e}")))?;
        Ok(Self::with_provider(config, embedding))
    }

    /// Create a manager with an externally supplied embedding provider.
    pub fn with_provider(config: MemoryConfig, embedding: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            config,
            embedding,
            current: Mutex::new(None),
        }
    }

    /// The configuration this manager constructs stores from.
    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    /// Get the shared store, constructing it on first access.
    ///
    /// Every caller observes the same instance until `recreate` is called.
    pub async fn get_or_create(&self) -> Result<Arc<MemoryStore>> {
        let mut current = self.current.lock().await;
        if let Some(store) = current.as_ref() {
            return Ok(store.clone());
        }

        let store = Arc::new(
            MemoryStore::open(self.config.persist_dir.clone(), self.embedding.clone()).await?,
        );
        tracing::info!(
            dir = %self.config.persist_dir.display(),
            "shared memory store constructed"
        );
        *current = Some(store.clone());
        Ok(store)
    }

    /// Tear down the current instance and construct a fresh one.
    ///
    /// Used by tests and explicit administrative resets.
    pub async fn recreate(&self) -> Result<Arc<MemoryStore>> {
        let mut current = self.current.lock().await;
        *current = None;
        tracing::info!("memory store instance torn down; reconstructing");

        let store = Arc::new(
            MemoryStore::open(self.config.persist_dir.clone(), self.embedding.clone()).await?,
        );
        *current = Some(store.clone());
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    struct FixedEmbedding;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedding {
        fn name(&self) -> &str {
            "fixed"
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0, 0.0]).collect())
        }
    }

    fn manager(tmp: &TempDir) -> StoreManager {
        let config = MemoryConfig::default().with_persist_dir(tmp.path());
        StoreManager::with_provider(config, Arc::new(FixedEmbedding))
    }

    #[tokio::test]
    async fn get_or_create_returns_same_instance() {
        let tmp = TempDir::new().unwrap();
        let manager = manager(&tmp);

        let first = manager.get_or_create().await.unwrap();
        let second = manager.get_or_create().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn recreate_yields_fresh_instance() {
        let tmp = TempDir::new().unwrap();
        let manager = manager(&tmp);

        let first = manager.get_or_create().await.unwrap();
        let second = manager.recreate().await.unwrap();
        assert!(!Arc::ptr_eq(&first, &second));

        // Subsequent accesses observe the new instance
        let third = manager.get_or_create().await.unwrap();
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[tokio::test]
    async fn concurrent_first_access_constructs_once() {
        let tmp = TempDir::new().unwrap();
        let manager = Arc::new(manager(&tmp));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move { manager.get_or_create().await }));
        }

        let mut stores = Vec::new();
        for handle in handles {
            stores.push(handle.await.unwrap().unwrap());
        }
        for store in &stores[1..] {
            assert!(Arc::ptr_eq(&stores[0], store));
        }
    }

    #[tokio::test]
    async fn store_survives_reopen_at_same_path() {
        let tmp = TempDir::new().unwrap();

        {
            let manager = manager(&tmp);
            let store = manager.get_or_create().await.unwrap();
            store
                .save_knowledge("kb_1", "A", "A is B", "x", &[], None)
                .await
                .unwrap();
        }

        // A fresh manager pointed at the same path sees the data
        let manager = manager(&tmp);
        let store = manager.get_or_create().await.unwrap();
        let entry = store.get_knowledge("kb_1").await.unwrap();
        assert!(entry.is_some());
    }
}
