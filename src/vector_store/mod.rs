//! Vector store abstraction for Spole.
//!
//! Provides a trait-based, collection-oriented interface for vector
//! database backends. A collection is a named persistent set of embedded
//! chunks, searchable by similarity; its lifecycle is owned by the caller.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata attached to an ingested chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub video_title: String,
    pub video_url: String,
    pub video_id: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Pre-rendered `HH:MM:SS - HH:MM:SS` range for display.
    pub timestamp: String,
}

/// A chunk as stored in a collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique id, assigned at ingestion time.
    pub id: Uuid,
    /// Chunk text (the similarity-searched document).
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Embedding vector.
    pub embedding: Vec<f32>,
}

/// A similarity-ranked query hit.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
    /// Cosine similarity (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
///
/// `count` and `delete_collection` fail with
/// [`SpoleError::CollectionNotFound`](crate::SpoleError::CollectionNotFound)
/// when the collection is absent; callers use that as an existence probe.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create an empty collection.
    async fn create_collection(&self, name: &str) -> Result<()>;

    /// Delete a collection and everything in it.
    async fn delete_collection(&self, name: &str) -> Result<()>;

    /// Number of chunks stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Add a batch of chunks to a collection as one atomic call.
    async fn add(&self, collection: &str, chunks: &[StoredChunk]) -> Result<()>;

    /// Query a collection for the `top_k` most similar chunks.
    async fn query(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
pub(crate) fn test_chunk(text: &str, embedding: Vec<f32>) -> StoredChunk {
    StoredChunk {
        id: Uuid::new_v4(),
        text: text.to_string(),
        metadata: ChunkMetadata {
            video_title: "Test Video".to_string(),
            video_url: "https://youtu.be/abc123def45".to_string(),
            video_id: "abc123def45".to_string(),
            start_time: 0.0,
            end_time: 10.0,
            timestamp: "00:00:00 - 00:00:10".to_string(),
        },
        embedding,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
