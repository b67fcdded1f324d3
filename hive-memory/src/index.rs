//! SQLite-backed persistent vector index, one per collection.
//!
//! Each collection lives in its own database file under the store's persist
//! directory. Documents are kept with their embedding as a BLOB; semantic
//! queries run a brute-force cosine scan over the stored vectors. Blocking
//! rusqlite work runs inside `spawn_blocking`, one connection per operation.

use crate::embeddings::EmbeddingProvider;
use crate::error::{Error, Result};
use crate::registry::CollectionSpec;
use crate::types::{Document, MetadataFilter, MetadataMap, SearchHit};
use crate::vector::{
    bytes_to_vec, cosine_distance, distance_to_similarity, normalize, vec_to_bytes,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_created ON documents(created_at);

CREATE TABLE IF NOT EXISTS collection_meta (
    name TEXT PRIMARY KEY,
    metric TEXT NOT NULL,
    description TEXT NOT NULL
);
"#;

/// Persistent vector index for a single collection.
pub struct VectorIndex {
    collection: String,
    db_path: PathBuf,
    embedding: Arc<dyn EmbeddingProvider>,
    dimension: usize,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("collection", &self.collection)
            .field("db_path", &self.db_path)
            .field("embedding", &self.embedding.name())
            .field("dimension", &self.dimension)
            .finish()
    }
}

fn open_conn(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    // WAL keeps readers unblocked during writes; the busy timeout makes
    // concurrent writers to the same file queue instead of failing
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    Ok(conn)
}

impl VectorIndex {
    /// Open (or create) the index for a collection under `dir`.
    ///
    /// Fails fast when the embedding provider reports zero dimensions or
    /// the database cannot be initialized.
    pub async fn open(
        dir: &Path,
        spec: &CollectionSpec,
        embedding: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        let dimension = embedding.dimensions();
        if dimension == 0 {
            return Err(Error::Init(format!(
                "embedding provider '{}' must have non-zero dimensions",
                embedding.name()
            )));
        }

        let db_path = dir.join(format!("{}.db", spec.name));
        let collection = spec.name.to_string();

        let path = db_path.clone();
        let name = collection.clone();
        let metric = spec.metric.to_string();
        let description = spec.description.to_string();

        tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
            let conn = open_conn(&path)?;
            conn.execute_batch(SCHEMA)?;
            conn.execute(
                "INSERT OR REPLACE INTO collection_meta (name, metric, description) VALUES (?1, ?2, ?3)",
                params![name, metric, description],
            )?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Init(format!("collection '{collection}': {e}")))?
        .map_err(|e| Error::Init(format!("collection '{collection}': {e}")))?;

        tracing::info!(collection = %collection, dimension, "collection ready");

        Ok(Self {
            collection,
            db_path,
            embedding,
            dimension,
        })
    }

    /// Collection name this index serves.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Vector dimensions expected by this index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Insert or fully replace the document under its id.
    ///
    /// A single upsert statement keeps the replace atomic per id: readers
    /// observe either the prior document or the new one, never a gap.
    pub async fn upsert(&self, doc: Document) -> Result<String> {
        let mut vector = self
            .embedding
            .embed_one(&doc.content)
            .await
            .map_err(|e| Error::embedding(&self.collection, e))?;
        normalize(&mut vector);
        let embedding_bytes = vec_to_bytes(&vector);

        let id = doc.id.clone();
        self.with_conn("upsert", move |conn| {
            let metadata_json = serde_json::to_string(&doc.metadata)?;
            conn.execute(
                r#"
                INSERT INTO documents (id, content, metadata, embedding, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(id) DO UPDATE SET
                    content = excluded.content,
                    metadata = excluded.metadata,
                    embedding = excluded.embedding,
                    updated_at = excluded.updated_at
                "#,
                params![
                    doc.id,
                    doc.content,
                    metadata_json,
                    embedding_bytes,
                    doc.created_at,
                    doc.updated_at
                ],
            )?;
            Ok(())
        })
        .await?;

        tracing::debug!(id = %id, collection = %self.collection, "document upserted");
        Ok(id)
    }

    /// Exact lookup by id. A missing id is `Ok(None)`, never an error.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<Document>> {
        let id = id.to_string();
        self.with_conn("get", move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, content, metadata, created_at, updated_at FROM documents WHERE id = ?1",
                    params![id],
                    row_to_parts,
                )
                .optional()?;

            row.map(parts_to_document).transpose()
        })
        .await
    }

    /// Unordered retrieval of documents matching the metadata filter,
    /// capped at `limit` after filtering.
    pub async fn get_by_filter(
        &self,
        filter: MetadataFilter,
        limit: usize,
    ) -> Result<Vec<Document>> {
        self.with_conn("list", move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, metadata, created_at, updated_at FROM documents ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], row_to_parts)?;

            let mut docs = Vec::new();
            for row in rows {
                let doc = parts_to_document(row?)?;
                if !filter.matches(&doc.metadata) {
                    continue;
                }
                docs.push(doc);
                if docs.len() >= limit {
                    break;
                }
            }
            Ok(docs)
        })
        .await
    }

    /// Semantic search: up to `k` nearest documents honoring the filter,
    /// ordered by descending similarity. The scan visits rows in insertion
    /// order and the sort is stable, so earlier documents win ties.
    pub async fn query(
        &self,
        text: &str,
        k: usize,
        filter: Option<MetadataFilter>,
    ) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut query_vector = self
            .embedding
            .embed_one(text)
            .await
            .map_err(|e| Error::embedding(&self.collection, e))?;
        normalize(&mut query_vector);

        self.with_conn("query", move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, metadata, embedding, created_at, updated_at FROM documents ORDER BY rowid",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Vec<u8>>(3)?,
                    row.get::<_, i64>(4)?,
                    row.get::<_, i64>(5)?,
                ))
            })?;

            let mut hits = Vec::new();
            for row in rows {
                let (id, content, metadata_json, embedding_bytes, created_at, updated_at) = row?;
                let metadata: MetadataMap = serde_json::from_str(&metadata_json)?;
                if let Some(ref f) = filter {
                    if !f.matches(&metadata) {
                        continue;
                    }
                }

                let stored = bytes_to_vec(&embedding_bytes);
                let distance = cosine_distance(&query_vector, &stored);
                let similarity = distance_to_similarity(distance)?;

                hits.push(SearchHit {
                    document: Document {
                        id,
                        content,
                        metadata,
                        created_at,
                        updated_at,
                    },
                    similarity,
                });
            }

            hits.sort_by(|a, b| {
                b.similarity
                    .partial_cmp(&a.similarity)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            hits.truncate(k);
            Ok(hits)
        })
        .await
    }

    /// Delete the listed ids. Absent ids are silently ignored and not
    /// counted; returns the number of documents actually removed.
    pub async fn delete(&self, ids: Vec<String>) -> Result<usize> {
        self.with_conn("delete", move |conn| {
            let mut removed = 0;
            for id in &ids {
                removed += conn.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
            }
            Ok(removed)
        })
        .await
    }

    /// Delete every document matching the filter; returns the count removed.
    pub async fn delete_by_filter(&self, filter: MetadataFilter) -> Result<usize> {
        self.with_conn("delete", move |mut conn| {
            let tx = conn.transaction()?;
            let ids: Vec<String> = {
                let mut stmt = tx.prepare("SELECT id, metadata FROM documents")?;
                let rows = stmt.query_map([], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;

                let mut matching = Vec::new();
                for row in rows {
                    let (id, metadata_json) = row?;
                    let metadata: MetadataMap = serde_json::from_str(&metadata_json)?;
                    if filter.matches(&metadata) {
                        matching.push(id);
                    }
                }
                matching
            };

            let mut removed = 0;
            for id in &ids {
                removed += tx.execute("DELETE FROM documents WHERE id = ?1", params![id])?;
            }
            tx.commit()?;
            Ok(removed)
        })
        .await
    }

    /// Total live documents.
    pub async fn count(&self) -> Result<usize> {
        self.with_conn("count", move |conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    /// Every document in the collection, ordered by creation time.
    pub async fn all_documents(&self) -> Result<Vec<Document>> {
        self.with_conn("export", move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, metadata, created_at, updated_at FROM documents ORDER BY created_at, id",
            )?;
            let rows = stmt.query_map([], row_to_parts)?;

            let mut docs = Vec::new();
            for row in rows {
                docs.push(parts_to_document(row?)?);
            }
            Ok(docs)
        })
        .await
    }

    /// Remove every document; returns the count removed.
    pub async fn clear(&self) -> Result<usize> {
        self.with_conn("clear", move |conn| {
            Ok(conn.execute("DELETE FROM documents", [])?)
        })
        .await
    }

    /// Run blocking database work on the blocking pool, labeling any
    /// failure with this collection and the operation name.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(Connection) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        let joined = tokio::task::spawn_blocking(move || -> anyhow::Result<T> {
            let conn = open_conn(&path)?;
            f(conn)
        })
        .await;

        match joined {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::error!(collection = %self.collection, operation, error = %e, "index operation failed");
                Err(Error::collection(&self.collection, operation, e))
            }
            Err(e) => Err(Error::collection(&self.collection, operation, e)),
        }
    }
}

type DocumentParts = (String, String, String, i64, i64);

fn row_to_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<DocumentParts> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn parts_to_document(parts: DocumentParts) -> anyhow::Result<Document> {
    let (id, content, metadata_json, created_at, updated_at) = parts;
    let metadata: MetadataMap = serde_json::from_str(&metadata_json)?;
    Ok(Document {
        id,
        content,
        metadata,
        created_at,
        updated_at,
    })
}
