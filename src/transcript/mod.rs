//! Transcript fetching abstraction for Spole.
//!
//! Provides a trait-based interface for retrieving timestamped captions
//! and basic video metadata from an external platform.

pub mod youtube;

pub use youtube::YoutubeFetcher;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single timestamped caption entry, ordered by start time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionEntry {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl CaptionEntry {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time of this entry in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Metadata about a video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Title.
    pub title: String,
    /// Original URL the video was requested with.
    pub url: String,
    /// Platform video ID.
    pub video_id: String,
    /// Duration in seconds (0 if unknown).
    pub duration_seconds: u32,
    /// Upload date as reported by the platform (YYYYMMDD).
    pub upload_date: String,
}

/// Trait for transcript providers.
///
/// Both calls signal lookup failures (private video, captions disabled,
/// missing language track) as errors the caller must catch per task.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch metadata for a video URL.
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata>;

    /// Fetch the ordered caption entries for a video, in the given language.
    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Result<Vec<CaptionEntry>>;
}
