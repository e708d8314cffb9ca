//! Batched ingestion of chunk sets into the vector store.
//!
//! Ingestion is idempotent by count: if the target collection already holds
//! exactly as many chunks as the incoming set, it is treated as up to date
//! and nothing is written. On a count mismatch the collection is deleted and
//! rebuilt from scratch. Content changes that keep the count identical are
//! not detected; this is a known limitation of the count-based check.

use crate::chunking::{format_timestamp, Chunk};
use crate::embedding::Embedder;
use crate::error::{Result, SpoleError};
use crate::vector_store::{ChunkMetadata, StoredChunk, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Pushes chunk records into a vector store collection in fixed-size batches.
pub struct Ingestor {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    collection: String,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        collection: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            collection: collection.into(),
            batch_size: batch_size.max(1),
        }
    }

    /// Ingest a chunk set, returning the number of chunks written this run.
    ///
    /// Each chunk gets a freshly generated UUID. Batches are submitted
    /// sequentially; the store may not guarantee cross-batch write isolation.
    #[instrument(skip(self, chunks), fields(collection = %self.collection, chunks = chunks.len()))]
    pub async fn ingest(&self, chunks: &[Chunk]) -> Result<usize> {
        match self.store.count(&self.collection).await {
            Ok(existing) if existing == chunks.len() => {
                info!(
                    "Collection '{}' is up to date with {} chunks",
                    self.collection, existing
                );
                return Ok(0);
            }
            Ok(existing) => {
                info!(
                    "Collection '{}' size mismatch ({} vs {} chunks), rebuilding",
                    self.collection,
                    existing,
                    chunks.len()
                );
                self.store.delete_collection(&self.collection).await?;
                self.store.create_collection(&self.collection).await?;
            }
            Err(SpoleError::CollectionNotFound(_)) => {
                info!("Creating collection '{}'", self.collection);
                self.store.create_collection(&self.collection).await?;
            }
            Err(e) => return Err(e),
        }

        let mut committed = 0;

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(SpoleError::Ingest(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            let records: Vec<StoredChunk> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| StoredChunk {
                    id: Uuid::new_v4(),
                    text: chunk.text.clone(),
                    metadata: ChunkMetadata {
                        video_title: chunk.video_title.clone(),
                        video_url: chunk.video_url.clone(),
                        video_id: chunk.video_id.clone(),
                        start_time: chunk.start_time,
                        end_time: chunk.end_time,
                        timestamp: format!(
                            "{} - {}",
                            format_timestamp(chunk.start_time),
                            format_timestamp(chunk.end_time)
                        ),
                    },
                    embedding,
                })
                .collect();

            self.store.add(&self.collection, &records).await?;
            committed += records.len();
            info!(
                "Added chunks {} to {}",
                committed - records.len(),
                committed
            );
        }

        Ok(committed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;
    use crate::vector_store::MemoryVectorStore;

    fn chunks(n: usize) -> Vec<Chunk> {
        (0..n)
            .map(|i| Chunk {
                text: format!("chunk number {}", i),
                start_time: i as f64 * 10.0,
                end_time: i as f64 * 10.0 + 10.0,
                video_title: "Title".to_string(),
                video_url: "https://youtu.be/abc123def45".to_string(),
                video_id: "abc123def45".to_string(),
            })
            .collect()
    }

    fn ingestor(store: Arc<MemoryVectorStore>, batch_size: usize) -> Ingestor {
        Ingestor::new(store, Arc::new(HashEmbedder), "videos", batch_size)
    }

    #[tokio::test]
    async fn test_batch_partitioning() {
        let store = Arc::new(MemoryVectorStore::new());
        let committed = ingestor(store.clone(), 2).ingest(&chunks(5)).await.unwrap();

        assert_eq!(committed, 5);
        assert_eq!(store.count("videos").await.unwrap(), 5);
        // ceil(5/2) add calls
        assert_eq!(store.add_call_count(), 3);
    }

    #[tokio::test]
    async fn test_exact_multiple_batches() {
        let store = Arc::new(MemoryVectorStore::new());
        let committed = ingestor(store.clone(), 2).ingest(&chunks(4)).await.unwrap();

        assert_eq!(committed, 4);
        assert_eq!(store.add_call_count(), 2);
    }

    #[tokio::test]
    async fn test_matching_count_skips_ingestion() {
        let store = Arc::new(MemoryVectorStore::new());
        let set = chunks(3);

        let first = ingestor(store.clone(), 10).ingest(&set).await.unwrap();
        assert_eq!(first, 3);
        let calls_after_first = store.add_call_count();

        let second = ingestor(store.clone(), 10).ingest(&set).await.unwrap();
        assert_eq!(second, 0);
        assert_eq!(store.add_call_count(), calls_after_first);
        assert_eq!(store.count("videos").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_count_mismatch_rebuilds_collection() {
        let store = Arc::new(MemoryVectorStore::new());

        ingestor(store.clone(), 10).ingest(&chunks(3)).await.unwrap();
        let committed = ingestor(store.clone(), 10).ingest(&chunks(5)).await.unwrap();

        assert_eq!(committed, 5);
        assert_eq!(store.count("videos").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_ingested_metadata_carries_timestamp_range() {
        let store = Arc::new(MemoryVectorStore::new());
        ingestor(store.clone(), 10).ingest(&chunks(1)).await.unwrap();

        let results = store
            .query("videos", &HashEmbedder.embed("chunk number 0").await.unwrap(), 1)
            .await
            .unwrap();
        assert_eq!(results[0].metadata.timestamp, "00:00:00 - 00:00:10");
    }
}
