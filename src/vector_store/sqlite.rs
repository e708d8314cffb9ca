//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For production use cases with large datasets, consider the sqlite-vec
//! extension or a dedicated vector database.

use super::{cosine_similarity, ChunkMetadata, ScoredChunk, StoredChunk, VectorStore};
use crate::error::{Result, SpoleError};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS collections (
        name TEXT PRIMARY KEY,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chunks (
        id TEXT PRIMARY KEY,
        collection TEXT NOT NULL REFERENCES collections(name) ON DELETE CASCADE,
        text TEXT NOT NULL,
        video_title TEXT NOT NULL,
        video_url TEXT NOT NULL,
        video_id TEXT NOT NULL,
        start_time REAL NOT NULL,
        end_time REAL NOT NULL,
        timestamp TEXT NOT NULL,
        embedding BLOB NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);
"#;

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| SpoleError::VectorStore(format!("Failed to acquire lock: {}", e)))
    }

    fn collection_exists(conn: &Connection, name: &str) -> Result<bool> {
        let found: Option<String> = conn
            .query_row(
                "SELECT name FROM collections WHERE name = ?1",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self))]
    async fn create_collection(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;

        if Self::collection_exists(&conn, name)? {
            return Err(SpoleError::VectorStore(format!(
                "Collection '{}' already exists",
                name
            )));
        }

        conn.execute(
            "INSERT INTO collections (name, created_at) VALUES (?1, ?2)",
            params![name, chrono::Utc::now().to_rfc3339()],
        )?;

        debug!("Created collection '{}'", name);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<()> {
        let conn = self.lock()?;

        let deleted = conn.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
        if deleted == 0 {
            return Err(SpoleError::CollectionNotFound(name.to_string()));
        }

        info!("Deleted collection '{}'", name);
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let conn = self.lock()?;

        if !Self::collection_exists(&conn, collection)? {
            return Err(SpoleError::CollectionNotFound(collection.to_string()));
        }

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;

        Ok(count as usize)
    }

    #[instrument(skip(self, chunks), fields(count = chunks.len()))]
    async fn add(&self, collection: &str, chunks: &[StoredChunk]) -> Result<()> {
        let conn = self.lock()?;

        if !Self::collection_exists(&conn, collection)? {
            return Err(SpoleError::CollectionNotFound(collection.to_string()));
        }

        let tx = conn.unchecked_transaction()?;

        for chunk in chunks {
            let embedding_bytes = Self::embedding_to_bytes(&chunk.embedding);

            tx.execute(
                r#"
                INSERT INTO chunks
                (id, collection, text, video_title, video_url, video_id,
                 start_time, end_time, timestamp, embedding)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
                params![
                    chunk.id.to_string(),
                    collection,
                    chunk.text,
                    chunk.metadata.video_title,
                    chunk.metadata.video_url,
                    chunk.metadata.video_id,
                    chunk.metadata.start_time,
                    chunk.metadata.end_time,
                    chunk.metadata.timestamp,
                    embedding_bytes,
                ],
            )?;
        }

        tx.commit()?;
        debug!("Added {} chunks to '{}'", chunks.len(), collection);
        Ok(())
    }

    #[instrument(skip(self, query_embedding))]
    async fn query(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let conn = self.lock()?;

        if !Self::collection_exists(&conn, collection)? {
            return Err(SpoleError::CollectionNotFound(collection.to_string()));
        }

        let mut stmt = conn.prepare(
            r#"
            SELECT text, video_title, video_url, video_id,
                   start_time, end_time, timestamp, embedding
            FROM chunks
            WHERE collection = ?1
            "#,
        )?;

        let rows = stmt.query_map(params![collection], |row| {
            let embedding_bytes: Vec<u8> = row.get(7)?;
            Ok((
                row.get::<_, String>(0)?,
                ChunkMetadata {
                    video_title: row.get(1)?,
                    video_url: row.get(2)?,
                    video_id: row.get(3)?,
                    start_time: row.get(4)?,
                    end_time: row.get(5)?,
                    timestamp: row.get(6)?,
                },
                Self::bytes_to_embedding(&embedding_bytes),
            ))
        })?;

        // A row that fails to decode is data corruption, not a skippable hit
        let rows = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        let mut results: Vec<ScoredChunk> = rows
            .into_iter()
            .map(|(text, metadata, embedding)| ScoredChunk {
                text,
                metadata,
                score: cosine_similarity(query_embedding, &embedding),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::test_chunk;

    #[tokio::test]
    async fn test_collection_lifecycle() {
        let store = SqliteVectorStore::in_memory().unwrap();

        assert!(matches!(
            store.count("videos").await,
            Err(SpoleError::CollectionNotFound(_))
        ));

        store.create_collection("videos").await.unwrap();
        assert_eq!(store.count("videos").await.unwrap(), 0);
        assert!(store.create_collection("videos").await.is_err());

        store.delete_collection("videos").await.unwrap();
        assert!(store.count("videos").await.is_err());
    }

    #[tokio::test]
    async fn test_add_and_query() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.create_collection("videos").await.unwrap();

        store
            .add(
                "videos",
                &[
                    test_chunk("exact match", vec![1.0, 0.0, 0.0]),
                    test_chunk("unrelated", vec![0.0, 1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.count("videos").await.unwrap(), 2);

        let results = store.query("videos", &[1.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, "exact match");
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].metadata.timestamp, "00:00:00 - 00:00:10");
    }

    #[tokio::test]
    async fn test_delete_collection_removes_chunks() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.create_collection("videos").await.unwrap();
        store
            .add("videos", &[test_chunk("a", vec![1.0, 0.0])])
            .await
            .unwrap();

        store.delete_collection("videos").await.unwrap();

        store.create_collection("videos").await.unwrap();
        assert_eq!(store.count("videos").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_query_surfaces_row_decode_errors() {
        let store = SqliteVectorStore::in_memory().unwrap();
        store.create_collection("videos").await.unwrap();

        // Bypass add() to plant a row whose start_time is not a number
        {
            let conn = store.conn.lock().unwrap();
            conn.execute(
                r#"
                INSERT INTO chunks
                (id, collection, text, video_title, video_url, video_id,
                 start_time, end_time, timestamp, embedding)
                VALUES ('bad-row', 'videos', 'text', 'title', 'url', 'id',
                        'not a number', 10.0, '00:00:00 - 00:00:10', x'0000803f')
                "#,
                [],
            )
            .unwrap();
        }

        assert!(matches!(
            store.query("videos", &[1.0], 5).await,
            Err(SpoleError::Database(_))
        ));
    }

    #[tokio::test]
    async fn test_embedding_round_trip() {
        let embedding = vec![0.25f32, -1.5, 3.75];
        let bytes = SqliteVectorStore::embedding_to_bytes(&embedding);
        assert_eq!(SqliteVectorStore::bytes_to_embedding(&bytes), embedding);
    }
}
