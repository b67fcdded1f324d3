//! The memory store: the public API over the fixed collection set.
//!
//! Conversation history, projects, employees, the knowledge base, and agent
//! outputs each live in their own collection. Every `save_*` operation is an
//! upsert keyed by the caller-supplied id; search operations return hits
//! scored in `[0, 1]`.

use crate::embeddings::EmbeddingProvider;
use crate::error::Result;
use crate::registry::{
    CollectionRegistry, AGENT_OUTPUTS, CONVERSATIONS, EMPLOYEES, KNOWLEDGE, PROJECTS,
};
use crate::types::{Document, MetadataFilter, MetadataMap, MetadataValue, SearchHit};
use crate::vector::merge_ranked;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Persistent, multi-collection semantic memory store.
///
/// Owns its collection registry and, transitively, every vector index. The
/// embedding provider is shared read-only across all collections.
pub struct MemoryStore {
    persist_dir: PathBuf,
    registry: CollectionRegistry,
}

impl MemoryStore {
    /// Open the store at `dir`, creating every collection eagerly.
    ///
    /// Fails fast: if any single collection cannot be initialized, no store
    /// is returned.
    pub async fn open(
        dir: impl Into<PathBuf>,
        embedding: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let persist_dir = dir.into();
        let registry = CollectionRegistry::open(&persist_dir, embedding).await?;

        tracing::info!(
            dir = %persist_dir.display(),
            collections = registry.len(),
            "memory store opened"
        );

        Ok(Self {
            persist_dir,
            registry,
        })
    }

    /// The directory holding this store's collection databases.
    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    // ==================== CONVERSATIONS ====================

    /// Save one conversation turn.
    ///
    /// The document id is derived from `(session_id, timestamp millis)`, so
    /// turns sort chronologically by id. A later write within the same
    /// millisecond overwrites the earlier one; accepted at extreme write
    /// rates.
    pub async fn save_turn(
        &self,
        session_id: &str,
        agent_name: &str,
        user_message: &str,
        agent_response: &str,
        metadata: MetadataMap,
    ) -> Result<String> {
        let now = chrono::Utc::now();
        let millis = now.timestamp_millis();
        let doc_id = format!("{session_id}_{millis}");

        let content = format!("User: {user_message}\n{agent_name}: {agent_response}");

        let mut meta = metadata;
        meta.insert("session_id".into(), session_id.into());
        meta.insert("agent_name".into(), agent_name.into());
        meta.insert("timestamp".into(), now.to_rfc3339().into());
        meta.insert(
            "message_length".into(),
            (user_message.len() + agent_response.len()).into(),
        );

        let doc = Document {
            id: doc_id,
            content,
            metadata: meta,
            created_at: millis,
            updated_at: millis,
        };

        self.registry.index(CONVERSATIONS)?.upsert(doc).await
    }

    /// Conversation history for a session, oldest first.
    ///
    /// Filters by session before capping at `limit`, so other sessions'
    /// turns never eat into the cap.
    pub async fn get_history(&self, session_id: &str, limit: usize) -> Result<Vec<Document>> {
        let filter = MetadataFilter::new().eq("session_id", session_id);
        let mut turns = self
            .registry
            .index(CONVERSATIONS)?
            .get_by_filter(filter, limit)
            .await?;
        turns.sort_by_key(|doc| doc.created_at);
        Ok(turns)
    }

    /// Delete every turn for a session; returns the number removed.
    ///
    /// A session with no turns yields 0, not an error.
    pub async fn clear_session(&self, session_id: &str) -> Result<usize> {
        let filter = MetadataFilter::new().eq("session_id", session_id);
        let removed = self
            .registry
            .index(CONVERSATIONS)?
            .delete_by_filter(filter)
            .await?;

        if removed > 0 {
            tracing::info!(session_id, removed, "session cleared");
        }
        Ok(removed)
    }

    /// Semantic search across conversations, optionally scoped to a session.
    pub async fn search_conversations(
        &self,
        query: &str,
        session_id: Option<&str>,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let filter = session_id.map(|sid| MetadataFilter::new().eq("session_id", sid));
        self.registry
            .index(CONVERSATIONS)?
            .query(query, k, filter)
            .await
    }

    // ==================== PROJECTS ====================

    /// Save or fully replace a project record.
    pub async fn save_project(
        &self,
        project_id: &str,
        project_name: &str,
        description: &str,
        assigned_agents: &[String],
        status: &str,
        extra: MetadataMap,
    ) -> Result<String> {
        let content = format!("{project_name}: {description}");

        let mut meta = extra;
        meta.insert("project_id".into(), project_id.into());
        meta.insert("project_name".into(), project_name.into());
        meta.insert(
            "assigned_agents".into(),
            MetadataValue::encode(&assigned_agents)?,
        );
        meta.insert("status".into(), status.into());
        meta.insert("agent_count".into(), assigned_agents.len().into());

        let id = self
            .registry
            .index(PROJECTS)?
            .upsert(Document::new(project_id, content, meta))
            .await?;
        tracing::info!(project = %project_name, "project saved");
        Ok(id)
    }

    /// Exact project lookup by id.
    pub async fn get_project(&self, project_id: &str) -> Result<Option<Document>> {
        self.registry.index(PROJECTS)?.get_by_id(project_id).await
    }

    /// Semantic search over projects.
    pub async fn search_projects(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        self.registry.index(PROJECTS)?.query(query, k, None).await
    }

    /// List projects, optionally filtered by status.
    pub async fn list_projects(
        &self,
        status: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let filter = match status {
            Some(status) => MetadataFilter::new().eq("status", status),
            None => MetadataFilter::new(),
        };
        self.registry
            .index(PROJECTS)?
            .get_by_filter(filter, limit)
            .await
    }

    // ==================== EMPLOYEES ====================

    /// Save or fully replace an employee record.
    pub async fn save_employee(
        &self,
        employee_id: &str,
        name: &str,
        role: &str,
        skills: &[String],
        projects: &[String],
        bio: Option<&str>,
    ) -> Result<String> {
        let mut content = format!("{name} - {role}: {}", skills.join(", "));
        if let Some(bio) = bio {
            content.push('\n');
            content.push_str(bio);
        }

        let mut meta = MetadataMap::new();
        meta.insert("employee_id".into(), employee_id.into());
        meta.insert("name".into(), name.into());
        meta.insert("role".into(), role.into());
        meta.insert("skills".into(), MetadataValue::encode(&skills)?);
        meta.insert("projects".into(), MetadataValue::encode(&projects)?);
        meta.insert("skill_count".into(), skills.len().into());

        let id = self
            .registry
            .index(EMPLOYEES)?
            .upsert(Document::new(employee_id, content, meta))
            .await?;
        tracing::info!(employee = %name, "employee saved");
        Ok(id)
    }

    /// Exact employee lookup by id.
    pub async fn get_employee(&self, employee_id: &str) -> Result<Option<Document>> {
        self.registry.index(EMPLOYEES)?.get_by_id(employee_id).await
    }

    /// Search employees by skills, role, or name; optionally filtered by role.
    pub async fn search_employees(
        &self,
        query: &str,
        role: Option<&str>,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let filter = role.map(|role| MetadataFilter::new().eq("role", role));
        self.registry.index(EMPLOYEES)?.query(query, k, filter).await
    }

    /// List employees, optionally filtered by role.
    pub async fn list_employees(
        &self,
        role: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let filter = match role {
            Some(role) => MetadataFilter::new().eq("role", role),
            None => MetadataFilter::new(),
        };
        self.registry
            .index(EMPLOYEES)?
            .get_by_filter(filter, limit)
            .await
    }

    // ==================== KNOWLEDGE BASE ====================

    /// Save or fully replace a knowledge base entry.
    pub async fn save_knowledge(
        &self,
        knowledge_id: &str,
        title: &str,
        content: &str,
        category: &str,
        tags: &[String],
        source: Option<&str>,
    ) -> Result<String> {
        let document = format!("{title}\n\n{content}");

        let mut meta = MetadataMap::new();
        meta.insert("knowledge_id".into(), knowledge_id.into());
        meta.insert("title".into(), title.into());
        meta.insert("category".into(), category.into());
        meta.insert("tags".into(), MetadataValue::encode(&tags)?);
        meta.insert("source".into(), source.unwrap_or("internal").into());
        meta.insert("content_length".into(), content.len().into());

        let id = self
            .registry
            .index(KNOWLEDGE)?
            .upsert(Document::new(knowledge_id, document, meta))
            .await?;
        tracing::info!(title = %title, "knowledge saved");
        Ok(id)
    }

    /// Exact knowledge lookup by id.
    pub async fn get_knowledge(&self, knowledge_id: &str) -> Result<Option<Document>> {
        self.registry.index(KNOWLEDGE)?.get_by_id(knowledge_id).await
    }

    /// Semantic search over the knowledge base, optionally by category.
    pub async fn search_knowledge(
        &self,
        query: &str,
        category: Option<&str>,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let filter = category.map(|cat| MetadataFilter::new().eq("category", cat));
        self.registry.index(KNOWLEDGE)?.query(query, k, filter).await
    }

    /// List knowledge entries, optionally filtered by category.
    pub async fn list_knowledge(
        &self,
        category: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let filter = match category {
            Some(cat) => MetadataFilter::new().eq("category", cat),
            None => MetadataFilter::new(),
        };
        self.registry
            .index(KNOWLEDGE)?
            .get_by_filter(filter, limit)
            .await
    }

    /// All distinct knowledge categories currently present, sorted.
    ///
    /// A live aggregate over stored entries; deletions are reflected.
    pub async fn list_categories(&self) -> Result<Vec<String>> {
        let docs = self.registry.index(KNOWLEDGE)?.all_documents().await?;
        let categories: BTreeSet<String> = docs
            .iter()
            .filter_map(|doc| doc.metadata.get("category"))
            .filter_map(|value| value.as_str())
            .map(str::to_string)
            .collect();
        Ok(categories.into_iter().collect())
    }

    // ==================== AGENT OUTPUTS ====================

    /// Save or fully replace an agent output (code, reports, analyses).
    pub async fn save_agent_output(
        &self,
        output_id: &str,
        agent_name: &str,
        task: &str,
        output: &str,
        output_type: &str,
        success: bool,
        metadata: MetadataMap,
    ) -> Result<String> {
        let content = format!("Task: {task}\n\nOutput:\n{output}");

        let mut meta = metadata;
        meta.insert("output_id".into(), output_id.into());
        meta.insert("agent_name".into(), agent_name.into());
        meta.insert("output_type".into(), output_type.into());
        meta.insert("success".into(), success.into());
        meta.insert("output_length".into(), output.len().into());

        let id = self
            .registry
            .index(AGENT_OUTPUTS)?
            .upsert(Document::new(output_id, content, meta))
            .await?;
        tracing::info!(agent = %agent_name, output_type = %output_type, "agent output saved");
        Ok(id)
    }

    /// Recent outputs from one agent, most recent first.
    pub async fn get_agent_outputs(
        &self,
        agent_name: &str,
        output_type: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>> {
        let mut filter = MetadataFilter::new().eq("agent_name", agent_name);
        if let Some(output_type) = output_type {
            filter = filter.eq("output_type", output_type);
        }

        let mut outputs = self
            .registry
            .index(AGENT_OUTPUTS)?
            .get_by_filter(filter, limit)
            .await?;
        outputs.sort_by_key(|doc| std::cmp::Reverse(doc.created_at));
        Ok(outputs)
    }

    /// Semantic search over agent outputs, optionally scoped to one agent.
    pub async fn search_agent_outputs(
        &self,
        query: &str,
        agent_name: Option<&str>,
        k: usize,
    ) -> Result<Vec<SearchHit>> {
        let filter = agent_name.map(|name| MetadataFilter::new().eq("agent_name", name));
        self.registry
            .index(AGENT_OUTPUTS)?
            .query(query, k, filter)
            .await
    }

    // ==================== CROSS-COLLECTION SEARCH ====================

    /// Search conversations and the knowledge base together.
    ///
    /// Each collection is queried independently with `k`; results are
    /// deduplicated by exact content (first occurrence wins) and re-ranked
    /// by similarity before truncation to `k`.
    pub async fn search_memory(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        let conversations = self.search_conversations(query, None, k).await?;
        let knowledge = self.search_knowledge(query, None, k).await?;
        Ok(merge_ranked(vec![conversations, knowledge], k))
    }

    // ==================== DOCUMENT LIFECYCLE ====================

    /// Delete a single document by id; returns true when it existed.
    pub async fn delete_document(&self, collection: &str, id: &str) -> Result<bool> {
        let removed = self
            .registry
            .index(collection)?
            .delete(vec![id.to_string()])
            .await?;
        Ok(removed > 0)
    }

    // ==================== ADMINISTRATIVE ====================

    /// Per-collection document counts plus a `total` key.
    ///
    /// A failing collection reports 0 and is logged; the rest still report.
    pub async fn stats(&self) -> BTreeMap<String, usize> {
        let mut stats = BTreeMap::new();
        let mut total = 0;

        for (name, index) in self.registry.iter() {
            let count = match index.count().await {
                Ok(count) => count,
                Err(e) => {
                    tracing::error!(collection = name, error = %e, "failed to count collection");
                    0
                }
            };
            total += count;
            stats.insert(name.to_string(), count);
        }

        stats.insert("total".into(), total);
        stats
    }

    /// Health report over every collection. Never errors; a collection that
    /// cannot report a count degrades the overall status.
    pub async fn health_check(&self) -> HealthReport {
        let mut report = HealthReport {
            status: HealthStatus::Healthy,
            persist_dir: self.persist_dir.clone(),
            collections: BTreeMap::new(),
            total_documents: 0,
        };

        for (name, index) in self.registry.iter() {
            match index.count().await {
                Ok(count) => {
                    report.total_documents += count;
                    report.collections.insert(
                        name.to_string(),
                        CollectionHealth::Ok {
                            document_count: count,
                        },
                    );
                }
                Err(e) => {
                    report.status = HealthStatus::Degraded;
                    report.collections.insert(
                        name.to_string(),
                        CollectionHealth::Error {
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        report
    }

    /// Export every document in a collection as JSON to `path`.
    ///
    /// Returns false for an unknown collection name rather than failing.
    pub async fn export_collection(&self, name: &str, path: &Path) -> Result<bool> {
        let Some(index) = self.registry.get(name) else {
            tracing::error!(collection = name, "collection not found for export");
            return Ok(false);
        };

        let docs = index.all_documents().await?;
        let export = CollectionExport {
            collection: name.to_string(),
            exported_at: chrono::Utc::now().to_rfc3339(),
            count: docs.len(),
            data: docs
                .into_iter()
                .map(|doc| ExportRecord {
                    id: doc.id,
                    document: doc.content,
                    metadata: doc.metadata,
                })
                .collect(),
        };

        let json = serde_json::to_vec_pretty(&export)?;
        tokio::fs::write(path, json).await?;

        tracing::info!(collection = name, path = %path.display(), "collection exported");
        Ok(true)
    }

    /// Destructive: remove every document from every collection.
    ///
    /// `confirm: false` is a logged no-op. The double guard against
    /// accidental data loss is intentional.
    pub async fn reset(&self, confirm: bool) -> Result<()> {
        if !confirm {
            tracing::warn!("reset called without confirmation; no action taken");
            return Ok(());
        }

        tracing::warn!("resetting all collections");
        for (name, index) in self.registry.iter() {
            match index.clear().await {
                Ok(removed) => tracing::info!(collection = name, removed, "collection reset"),
                Err(e) => {
                    tracing::error!(collection = name, error = %e, "failed to reset collection");
                }
            }
        }
        Ok(())
    }
}

/// Overall store health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

/// Per-collection health entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CollectionHealth {
    Ok { document_count: usize },
    Error { error: String },
}

/// Health report returned by [`MemoryStore::health_check`].
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub persist_dir: PathBuf,
    pub collections: BTreeMap<String, CollectionHealth>,
    pub total_documents: usize,
}

/// On-disk export envelope for one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionExport {
    pub collection: String,
    pub exported_at: String,
    pub count: usize,
    pub data: Vec<ExportRecord>,
}

/// One exported document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: String,
    pub document: String,
    pub metadata: MetadataMap,
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use tempfile::TempDir;

    /// Deterministic embedding hashing whitespace tokens into buckets.
    struct MockEmbedding {
        dims: usize,
    }

    #[async_trait]
    impl EmbeddingProvider for MockEmbedding {
        fn name(&self) -> &str {
            "mock"
        }

        fn dimensions(&self) -> usize {
            self.dims
        }

        async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts
                .iter()
                .map(|text| {
                    let mut vec = vec![0.0f32; self.dims];
                    for token in text.split_whitespace() {
                        use std::hash::{Hash, Hasher};
                        let mut hasher = std::collections::hash_map::DefaultHasher::new();
                        token.to_lowercase().hash(&mut hasher);
                        vec[(hasher.finish() as usize) % self.dims] += 1.0;
                    }
                    vec
                })
                .collect())
        }
    }

    async fn setup() -> (TempDir, MemoryStore) {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::open(tmp.path(), Arc::new(MockEmbedding { dims: 64 }))
            .await
            .unwrap();
        (tmp, store)
    }

    #[tokio::test]
    async fn save_turn_derives_session_prefixed_id() {
        let (_tmp, store) = setup().await;

        let id = store
            .save_turn("s1", "planner", "hello", "hi there", MetadataMap::new())
            .await
            .unwrap();
        assert!(id.starts_with("s1_"));

        let history = store.get_history("s1", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].content.contains("User: hello"));
        assert!(history[0].content.contains("planner: hi there"));
    }

    #[tokio::test]
    async fn clear_session_returns_zero_when_empty() {
        let (_tmp, store) = setup().await;
        assert_eq!(store.clear_session("ghost").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn project_upsert_is_idempotent() {
        let (_tmp, store) = setup().await;

        let agents = vec!["builder".to_string()];
        store
            .save_project("p1", "Apollo", "lunar lander", &agents, "active", MetadataMap::new())
            .await
            .unwrap();
        store
            .save_project("p1", "Apollo", "lunar lander v2", &agents, "paused", MetadataMap::new())
            .await
            .unwrap();

        let stats = store.stats().await;
        assert_eq!(stats["projects"], 1);

        let project = store.get_project("p1").await.unwrap().unwrap();
        assert!(project.content.contains("lunar lander v2"));
        assert_eq!(
            project.metadata.get("status").unwrap().as_str(),
            Some("paused")
        );
    }

    #[tokio::test]
    async fn list_projects_filters_by_status() {
        let (_tmp, store) = setup().await;

        let agents = vec!["builder".to_string()];
        store
            .save_project("p1", "One", "first", &agents, "active", MetadataMap::new())
            .await
            .unwrap();
        store
            .save_project("p2", "Two", "second", &agents, "done", MetadataMap::new())
            .await
            .unwrap();

        let active = store.list_projects(Some("active"), 10).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "p1");

        let all = store.list_projects(None, 10).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn employee_roundtrip_decodes_skills() {
        let (_tmp, store) = setup().await;

        let skills = vec!["rust".to_string(), "sql".to_string()];
        store
            .save_employee("e1", "Robin", "engineer", &skills, &[], Some("backend systems"))
            .await
            .unwrap();

        let employee = store.get_employee("e1").await.unwrap().unwrap();
        assert!(employee.content.contains("Robin - engineer"));
        assert!(employee.content.contains("backend systems"));

        let decoded: Vec<String> = employee.metadata.get("skills").unwrap().decode().unwrap();
        assert_eq!(decoded, skills);
    }

    #[tokio::test]
    async fn search_employees_honors_role_filter() {
        let (_tmp, store) = setup().await;

        store
            .save_employee("e1", "Robin", "engineer", &["rust".to_string()], &[], None)
            .await
            .unwrap();
        store
            .save_employee("e2", "Sam", "designer", &["figma".to_string()], &[], None)
            .await
            .unwrap();

        let hits = store
            .search_employees("rust figma", Some("designer"), 10)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.id, "e2");
    }

    #[tokio::test]
    async fn knowledge_categories_are_live() {
        let (_tmp, store) = setup().await;

        store
            .save_knowledge("kb_1", "A", "A is B", "x", &[], None)
            .await
            .unwrap();
        store
            .save_knowledge("kb_2", "C", "C is D", "y", &[], None)
            .await
            .unwrap();

        assert_eq!(store.list_categories().await.unwrap(), vec!["x", "y"]);

        assert!(store.delete_document(KNOWLEDGE, "kb_1").await.unwrap());
        assert_eq!(store.list_categories().await.unwrap(), vec!["y"]);
    }

    #[tokio::test]
    async fn agent_outputs_most_recent_first() {
        let (_tmp, store) = setup().await;

        store
            .save_agent_output("o1", "coder", "write fn", "fn a() {}", "code", true, MetadataMap::new())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .save_agent_output("o2", "coder", "write test", "#[test]", "code", true, MetadataMap::new())
            .await
            .unwrap();

        let outputs = store.get_agent_outputs("coder", None, 10).await.unwrap();
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].id, "o2");
        assert_eq!(outputs[1].id, "o1");

        let success = outputs[0].metadata.get("success").unwrap().as_bool();
        assert_eq!(success, Some(true));
    }

    #[tokio::test]
    async fn delete_document_unknown_collection_errors() {
        let (_tmp, store) = setup().await;
        let err = store.delete_document("sessions", "x").await.unwrap_err();
        assert!(err.to_string().contains("sessions"));
    }

    #[tokio::test]
    async fn health_check_reports_totals() {
        let (_tmp, store) = setup().await;

        store
            .save_knowledge("kb_1", "A", "A is B", "x", &[], None)
            .await
            .unwrap();

        let report = store.health_check().await;
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.total_documents, 1);
        assert_eq!(report.collections.len(), 5);
        assert!(matches!(
            report.collections["knowledge"],
            CollectionHealth::Ok { document_count: 1 }
        ));
    }

    #[tokio::test]
    async fn export_unknown_collection_returns_false() {
        let (tmp, store) = setup().await;
        let target = tmp.path().join("dump.json");
        assert!(!store.export_collection("sessions", &target).await.unwrap());
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn export_writes_envelope() {
        let (tmp, store) = setup().await;

        store
            .save_knowledge("kb_1", "A", "A is B", "x", &["tag1".to_string()], None)
            .await
            .unwrap();

        let target = tmp.path().join("knowledge.json");
        assert!(store.export_collection(KNOWLEDGE, &target).await.unwrap());

        let raw = std::fs::read_to_string(&target).unwrap();
        let export: CollectionExport = serde_json::from_str(&raw).unwrap();
        assert_eq!(export.collection, "knowledge");
        assert_eq!(export.count, 1);
        assert_eq!(export.data[0].id, "kb_1");
        assert!(export.data[0].document.contains("A is B"));
        assert!(export.data[0].metadata.contains_key("category"));
    }
}
