//! In-memory vector store implementation.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, ScoredChunk, StoredChunk, VectorStore};
use crate::error::{Result, SpoleError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

/// In-memory vector store.
pub struct MemoryVectorStore {
    collections: RwLock<HashMap<String, Vec<StoredChunk>>>,
    add_calls: AtomicUsize,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            add_calls: AtomicUsize::new(0),
        }
    }

    /// Number of `add` calls made against this store.
    pub fn add_call_count(&self) -> usize {
        self.add_calls.load(Ordering::Relaxed)
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn create_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        if collections.contains_key(name) {
            return Err(SpoleError::VectorStore(format!(
                "Collection '{}' already exists",
                name
            )));
        }
        collections.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn delete_collection(&self, name: &str) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        collections
            .remove(name)
            .ok_or_else(|| SpoleError::CollectionNotFound(name.to_string()))?;
        Ok(())
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().unwrap();
        collections
            .get(collection)
            .map(|chunks| chunks.len())
            .ok_or_else(|| SpoleError::CollectionNotFound(collection.to_string()))
    }

    async fn add(&self, collection: &str, chunks: &[StoredChunk]) -> Result<()> {
        let mut collections = self.collections.write().unwrap();
        let stored = collections
            .get_mut(collection)
            .ok_or_else(|| SpoleError::CollectionNotFound(collection.to_string()))?;

        stored.extend(chunks.iter().cloned());
        self.add_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn query(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let collections = self.collections.read().unwrap();
        let stored = collections
            .get(collection)
            .ok_or_else(|| SpoleError::CollectionNotFound(collection.to_string()))?;

        let mut results: Vec<ScoredChunk> = stored
            .iter()
            .map(|chunk| ScoredChunk {
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                score: cosine_similarity(query_embedding, &chunk.embedding),
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
    async fn test_missing_collection_is_not_found() {
        let store = MemoryVectorStore::new();

        assert!(matches!(
            store.count("nope").await,
            Err(SpoleError::CollectionNotFound(_))
        ));
        assert!(matches!(
            store.delete_collection("nope").await,
            Err(SpoleError::CollectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_add_count_delete() {
        let store = MemoryVectorStore::new();
        store.create_collection("videos").await.unwrap();
        assert_eq!(store.count("videos").await.unwrap(), 0);

        store
            .add(
                "videos",
                &[
                    test_chunk("a", vec![1.0, 0.0]),
                    test_chunk("b", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        assert_eq!(store.count("videos").await.unwrap(), 2);
        assert_eq!(store.add_call_count(), 1);

        store.delete_collection("videos").await.unwrap();
        assert!(store.count("videos").await.is_err());
    }

    #[tokio::test]
    async fn test_query_ranks_by_similarity() {
        let store = MemoryVectorStore::new();
        store.create_collection("videos").await.unwrap();
        store
            .add(
                "videos",
                &[
                    test_chunk("orthogonal", vec![0.0, 1.0]),
                    test_chunk("aligned", vec![1.0, 0.0]),
                ],
            )
            .await
            .unwrap();

        let results = store.query("videos", &[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "aligned");
        assert!(results[0].score > results[1].score);

        let top_one = store.query("videos", &[1.0, 0.0], 1).await.unwrap();
        assert_eq!(top_one.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_create_fails() {
        let store = MemoryVectorStore::new();
        store.create_collection("videos").await.unwrap();
        assert!(store.create_collection("videos").await.is_err());
    }
}
