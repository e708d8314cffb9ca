//! Concurrent multi-video processing.
//!
//! Fans fetch-and-chunk work out across a bounded pool of tasks, one per
//! URL, and collects whatever succeeded. A failure while fetching metadata,
//! fetching the transcript, or chunking drops that video from the batch; it
//! never aborts the other tasks. No retry is performed.

use crate::chunking::{chunk_entries, Chunk, ChunkingConfig};
use crate::error::Result;
use crate::transcript::{TranscriptFetcher, VideoMetadata};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Metadata recorded for a successfully processed video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedMeta {
    pub title: String,
    pub url: String,
    pub video_id: String,
    pub duration_seconds: u32,
    pub upload_date: String,
    pub processed_date: DateTime<Utc>,
}

impl ProcessedMeta {
    fn from_metadata(metadata: &VideoMetadata) -> Self {
        Self {
            title: metadata.title.clone(),
            url: metadata.url.clone(),
            video_id: metadata.video_id.clone(),
            duration_seconds: metadata.duration_seconds,
            upload_date: metadata.upload_date.clone(),
            processed_date: Utc::now(),
        }
    }
}

/// One successfully processed video with its ordered chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResult {
    pub metadata: ProcessedMeta,
    pub chunks: Vec<Chunk>,
}

/// Fetch-and-chunk pipeline over a transcript fetcher.
pub struct Pipeline {
    fetcher: Arc<dyn TranscriptFetcher>,
    chunking: ChunkingConfig,
    language: String,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn TranscriptFetcher>,
        chunking: ChunkingConfig,
        language: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            chunking,
            language: language.into(),
        }
    }

    /// Fetch and chunk a single video.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn process_video(&self, url: &str) -> Result<VideoResult> {
        let metadata = self.fetcher.fetch_metadata(url).await?;
        debug!("Fetched metadata: {}", metadata.title);

        let entries = self
            .fetcher
            .fetch_transcript(&metadata.video_id, &self.language)
            .await?;
        debug!("Fetched {} caption entries", entries.len());

        let chunks = chunk_entries(&entries, &metadata, &self.chunking);
        info!("Chunked '{}' into {} chunks", metadata.title, chunks.len());

        Ok(VideoResult {
            metadata: ProcessedMeta::from_metadata(&metadata),
            chunks,
        })
    }

    /// Process many URLs with at most `max_concurrent` in flight.
    ///
    /// Returns only the successes, in completion order. Per-video failures
    /// are logged and dropped; the call itself never fails.
    pub async fn process_videos(&self, urls: &[String], max_concurrent: usize) -> Vec<VideoResult> {
        let results: Vec<Option<VideoResult>> = stream::iter(urls.iter())
            .map(|url| async move {
                match self.process_video(url).await {
                    Ok(result) => Some(result),
                    Err(e) => {
                        warn!("Dropping {}: {}", url, e);
                        None
                    }
                }
            })
            .buffer_unordered(max_concurrent.max(1))
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }
}

/// Read URLs from a text file, one per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub fn read_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
