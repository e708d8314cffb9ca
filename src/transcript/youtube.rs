//! YouTube transcript fetcher implementation.
//!
//! Metadata comes from yt-dlp; captions are fetched by resolving the json3
//! caption track URL from the yt-dlp dump and downloading it directly.

use super::{CaptionEntry, TranscriptFetcher, VideoMetadata};
use crate::error::{Result, SpoleError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

/// YouTube transcript fetcher.
pub struct YoutubeFetcher {
    video_id_regex: Regex,
    http: reqwest::Client,
}

impl YoutubeFetcher {
    pub fn new() -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                # Full YouTube URLs
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            # Bare video ID (11 characters)
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        Self {
            video_id_regex,
            http: reqwest::Client::new(),
        }
    }

    /// Extract video ID from a YouTube URL or bare ID.
    pub fn extract_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;

        // Try group 1 (URL format) then group 2 (bare ID)
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Check if this fetcher can handle the given input.
    pub fn can_handle(&self, input: &str) -> bool {
        self.extract_video_id(input).is_some()
            || input.contains("youtube.com/playlist")
            || input.contains("youtube.com/channel")
            || input.contains("youtube.com/@")
    }

    /// Run yt-dlp and return the parsed info dump for a video.
    async fn dump_info(&self, video_id: &str) -> Result<serde_json::Value> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--dump-json",
                "--no-download",
                "--no-warnings",
                "--ignore-errors",
                &url,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpoleError::ToolNotFound("yt-dlp".to_string())
                } else {
                    SpoleError::VideoSource(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpoleError::VideoNotFound(format!(
                "Video {} not found or unavailable: {}",
                video_id, stderr
            )));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&json_str)
            .map_err(|e| SpoleError::VideoSource(format!("Failed to parse yt-dlp output: {}", e)))
    }

    /// Find the json3 caption track URL for a language in a yt-dlp dump.
    ///
    /// Manually uploaded subtitles are preferred over automatic captions.
    fn caption_track_url(info: &serde_json::Value, language: &str) -> Option<String> {
        for key in ["subtitles", "automatic_captions"] {
            let tracks = info
                .get(key)
                .and_then(|v| v.get(language))
                .and_then(|t| t.as_array());
            let Some(tracks) = tracks else {
                continue;
            };

            for track in tracks {
                if track.get("ext").and_then(|e| e.as_str()) == Some("json3") {
                    if let Some(url) = track.get("url").and_then(|u| u.as_str()) {
                        return Some(url.to_string());
                    }
                }
            }
        }
        None
    }

    /// List videos from a playlist or channel URL.
    pub async fn list_videos(&self, source: &str, limit: Option<usize>) -> Result<Vec<VideoMetadata>> {
        let limit_str = limit
            .map(|l| l.to_string())
            .unwrap_or_else(|| "1000".to_string());

        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--dump-json",
                "--no-download",
                "--no-warnings",
                "--flat-playlist",
                "--playlist-end",
                &limit_str,
                source,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpoleError::ToolNotFound("yt-dlp".to_string())
                } else {
                    SpoleError::VideoSource(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SpoleError::VideoSource(format!(
                "Failed to list videos: {}",
                stderr
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut videos = Vec::new();

        for line in stdout.lines() {
            if line.trim().is_empty() {
                continue;
            }

            if let Ok(json) = serde_json::from_str::<serde_json::Value>(line) {
                let id = json["id"]
                    .as_str()
                    .or_else(|| json["url"].as_str())
                    .map(|s| self.extract_video_id(s).unwrap_or_else(|| s.to_string()));

                if let Some(video_id) = id {
                    videos.push(VideoMetadata {
                        title: json["title"].as_str().unwrap_or("Unknown Title").to_string(),
                        url: format!("https://www.youtube.com/watch?v={}", video_id),
                        video_id,
                        duration_seconds: json["duration"].as_f64().unwrap_or(0.0) as u32,
                        upload_date: json["upload_date"].as_str().unwrap_or("").to_string(),
                    });
                }
            }
        }

        Ok(videos)
    }
}

impl Default for YoutubeFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeFetcher {
    async fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata> {
        let video_id = self.extract_video_id(url).ok_or_else(|| {
            SpoleError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", url))
        })?;

        let info = self.dump_info(&video_id).await?;

        Ok(VideoMetadata {
            title: info["title"].as_str().unwrap_or("Unknown Title").to_string(),
            url: url.to_string(),
            video_id,
            duration_seconds: info["duration"].as_f64().unwrap_or(0.0) as u32,
            upload_date: info["upload_date"].as_str().unwrap_or("").to_string(),
        })
    }

    async fn fetch_transcript(&self, video_id: &str, language: &str) -> Result<Vec<CaptionEntry>> {
        let info = self.dump_info(video_id).await?;

        let track_url = Self::caption_track_url(&info, language).ok_or_else(|| {
            SpoleError::TranscriptUnavailable(format!(
                "No '{}' captions for video {}",
                language, video_id
            ))
        })?;

        debug!("Fetching caption track for {}", video_id);
        let body = self.http.get(&track_url).send().await?.text().await?;

        let entries = parse_json3(&body)?;
        if entries.is_empty() {
            return Err(SpoleError::TranscriptUnavailable(format!(
                "Caption track for video {} is empty",
                video_id
            )));
        }

        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct Json3Track {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: f64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: f64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a json3 caption track into ordered caption entries.
///
/// Events without text (window definitions, music cues rendered as newlines)
/// are skipped.
pub fn parse_json3(body: &str) -> Result<Vec<CaptionEntry>> {
    let track: Json3Track = serde_json::from_str(body)?;

    let mut entries: Vec<CaptionEntry> = track
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs
                .iter()
                .map(|s| s.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ")
                .trim()
                .to_string();

            if text.is_empty() {
                return None;
            }

            Some(CaptionEntry {
                text,
                start: event.start_ms / 1000.0,
                duration: event.duration_ms / 1000.0,
            })
        })
        .collect();

    entries.sort_by(|a, b| a.start.partial_cmp(&b.start).unwrap_or(std::cmp::Ordering::Equal));

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        let fetcher = YoutubeFetcher::new();

        // Test various URL formats
        assert_eq!(
            fetcher.extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            fetcher.extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            fetcher.extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            fetcher.extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );

        // Test invalid inputs
        assert_eq!(fetcher.extract_video_id("not-a-video-id"), None);
        assert_eq!(fetcher.extract_video_id(""), None);
    }

    #[test]
    fn test_parse_json3() {
        let body = r#"{
            "events": [
                {"tStartMs": 0, "dDurationMs": 2000},
                {"tStartMs": 0, "dDurationMs": 5000, "segs": [{"utf8": "hello "}, {"utf8": "world"}]},
                {"tStartMs": 5000, "dDurationMs": 3000, "segs": [{"utf8": "second\nline"}]}
            ]
        }"#;

        let entries = parse_json3(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "hello world");
        assert_eq!(entries[0].start, 0.0);
        assert_eq!(entries[0].duration, 5.0);
        assert_eq!(entries[1].text, "second line");
        assert_eq!(entries[1].start, 5.0);
        assert_eq!(entries[1].end(), 8.0);
    }

    #[test]
    fn test_caption_track_prefers_manual_subtitles() {
        let info = serde_json::json!({
            "subtitles": {
                "en": [{"ext": "json3", "url": "https://example.com/manual"}]
            },
            "automatic_captions": {
                "en": [{"ext": "json3", "url": "https://example.com/auto"}]
            }
        });

        assert_eq!(
            YoutubeFetcher::caption_track_url(&info, "en"),
            Some("https://example.com/manual".to_string())
        );
        assert_eq!(YoutubeFetcher::caption_track_url(&info, "no"), None);
    }
}
