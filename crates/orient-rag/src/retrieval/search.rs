//! SQLite-backed vector store with brute-force cosine ranking

use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::VectorSearchResult;

/// Embedded documents of one collection
pub struct VectorStore {
    conn: Arc<Mutex<Connection>>,
    collection: String,
}

impl VectorStore {
    /// Create or open the index at the given path
    pub fn new<P: AsRef<Path>>(path: P, collection: impl Into<String>) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .map_err(|e| Error::vector_db(format!("Failed to open index: {}", e)))?;
        Self::with_connection(conn, collection.into())
    }

    /// Create an in-memory index (for testing)
    #[cfg(test)]
    pub fn in_memory(collection: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::vector_db(format!("Failed to open in-memory index: {}", e)))?;
        Self::with_connection(conn, collection.to_string())
    }

    fn with_connection(conn: Connection, collection: String) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS embeddings (
                id TEXT NOT NULL,
                collection TEXT NOT NULL,
                document TEXT NOT NULL,
                embedding BLOB NOT NULL,
                PRIMARY KEY (collection, id)
            );

            CREATE INDEX IF NOT EXISTS idx_embeddings_collection ON embeddings(collection);
            "#,
        )
        .map_err(|e| Error::vector_db(format!("Failed to create schema: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection,
        })
    }

    /// Collection this store reads and writes
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Insert or replace a document
    pub fn upsert(&self, id: &str, document: &str, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(Error::vector_db("Document has no embedding"));
        }

        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO embeddings (id, collection, document, embedding) VALUES (?1, ?2, ?3, ?4)",
            params![id, self.collection, document, encode_embedding(embedding)],
        )
        .map_err(|e| Error::vector_db(e.to_string()))?;
        Ok(())
    }

    /// Rank every document of the collection against the query, best first
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>> {
        if query_embedding.is_empty() {
            return Err(Error::vector_db("Query embedding is empty"));
        }

        let rows = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare("SELECT id, document, embedding FROM embeddings WHERE collection = ?1")
                .map_err(|e| Error::vector_db(e.to_string()))?;
            let rows = stmt
                .query_map(params![self.collection], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                    ))
                })
                .map_err(|e| Error::vector_db(e.to_string()))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::vector_db(e.to_string()))?;
            rows
        };

        let mut results: Vec<VectorSearchResult> = rows
            .into_iter()
            .filter_map(|(id, document, blob)| {
                let embedding = decode_embedding(&blob);
                match cosine_similarity(query_embedding, &embedding) {
                    Some(similarity) => Some(VectorSearchResult {
                        id,
                        document,
                        similarity,
                    }),
                    None => {
                        tracing::warn!(
                            "Skipping document {} (dimension {} != query {})",
                            id,
                            embedding.len(),
                            query_embedding.len()
                        );
                        None
                    }
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        results.truncate(top_k);
        Ok(results)
    }

    /// Number of documents in the collection
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM embeddings WHERE collection = ?1",
                params![self.collection],
                |row| row.get(0),
            )
            .map_err(|e| Error::vector_db(e.to_string()))?;
        Ok(count as usize)
    }

    /// Whether the collection holds no documents
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Cosine similarity, `None` when the dimensions differ or either vector is empty
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.is_empty() || a.len() != b.len() {
        return None;
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f32::EPSILON {
        return Some(0.0);
    }
    Some(dot / denom)
}

fn encode_embedding(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn decode_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), Some(1.0));
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), Some(0.0));
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let store = VectorStore::in_memory("Orientation").unwrap();
        store.upsert("cloud", "Cloud branch", &[1.0, 0.0, 0.0]).unwrap();
        store.upsert("data", "Data branch", &[0.7, 0.7, 0.0]).unwrap();
        store.upsert("cyber", "Cybersecurity branch", &[0.0, 0.0, 1.0]).unwrap();

        let results = store.search(&[1.0, 0.1, 0.0], 2).unwrap();
        let docs: Vec<&str> = results.iter().map(|r| r.document.as_str()).collect();
        assert_eq!(docs, vec!["Cloud branch", "Data branch"]);
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[test]
    fn test_upsert_replaces_existing_id() {
        let store = VectorStore::in_memory("Orientation").unwrap();
        store.upsert("a", "old", &[1.0, 0.0]).unwrap();
        store.upsert("a", "new", &[1.0, 0.0]).unwrap();
        assert_eq!(store.len().unwrap(), 1);

        let results = store.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(results[0].document, "new");
    }

    #[test]
    fn test_empty_index() {
        let store = VectorStore::in_memory("Orientation").unwrap();
        assert!(store.is_empty().unwrap());
        assert!(store.search(&[1.0, 0.0], 3).unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_dimensions_are_skipped() {
        let store = VectorStore::in_memory("Orientation").unwrap();
        store.upsert("short", "2d", &[1.0, 0.0]).unwrap();
        store.upsert("long", "3d", &[1.0, 0.0, 0.0]).unwrap();

        let results = store.search(&[1.0, 0.0, 0.0], 5).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "long");
    }

    #[test]
    fn test_on_disk_index_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("index.db");
        {
            let store = VectorStore::new(&path, "Orientation").unwrap();
            store.upsert("doc", "persisted", &[0.0, 1.0]).unwrap();
        }

        let reopened = VectorStore::new(&path, "Orientation").unwrap();
        assert_eq!(reopened.len().unwrap(), 1);

        let other = VectorStore::new(&path, "growing_vegetables").unwrap();
        assert!(other.is_empty().unwrap());
    }
}
