//! Overlapping word-count chunking of caption entries.
//!
//! Converts a sequence of timestamped caption entries into overlapping text
//! windows with start/end times. A window closes once its accumulated text
//! reaches the target word count; the last `overlap_entries` entries of the
//! closed window seed the next one so context carries across boundaries.

use crate::transcript::{CaptionEntry, VideoMetadata};
use serde::{Deserialize, Serialize};

/// A contiguous, possibly overlapping window of transcript text.
///
/// The serde field names are the durable chunk-set file format; they must
/// not change without a migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Space-joined text of the contributing caption entries, trimmed.
    pub text: String,
    /// Start time of the first contributing entry, in seconds.
    pub start_time: f64,
    /// End time of the last contributing entry, in seconds.
    pub end_time: f64,
    /// Title of the source video.
    pub video_title: String,
    /// URL of the source video.
    pub video_url: String,
    /// Platform ID of the source video.
    pub video_id: String,
}

impl Chunk {
    /// Render the chunk's time range as `HH:MM:SS - HH:MM:SS`.
    pub fn timestamp_range(&self) -> String {
        format!(
            "{} - {}",
            format_timestamp(self.start_time),
            format_timestamp(self.end_time)
        )
    }
}

/// Configuration for the chunker.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    /// Words accumulated before a window closes.
    pub target_word_count: usize,
    /// Trailing caption entries carried into the next window.
    ///
    /// Must stay below the per-chunk entry count, otherwise the accumulator
    /// never shrinks and chunks grow without bound.
    pub overlap_entries: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_word_count: 300,
            overlap_entries: 100,
        }
    }
}

/// Split caption entries into overlapping chunks.
///
/// Emits a chunk whenever the accumulated text reaches
/// `config.target_word_count` whitespace-delimited words, then seeds the next
/// accumulator with the last `config.overlap_entries` entries of the closed
/// window. Whatever remains accumulated when the input ends (including an
/// overlap-only remainder) is emitted as one final chunk, even if it is under
/// the target word count.
///
/// Timestamps are kept as float seconds; rounding happens only at
/// presentation time via [`format_timestamp`].
pub fn chunk_entries(
    entries: &[CaptionEntry],
    metadata: &VideoMetadata,
    config: &ChunkingConfig,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut window: Vec<&CaptionEntry> = Vec::new();
    let mut text = String::new();
    let mut window_start: Option<f64> = None;

    for entry in entries {
        if window_start.is_none() {
            window_start = Some(entry.start);
        }

        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&entry.text);
        window.push(entry);

        if text.split_whitespace().count() >= config.target_word_count {
            chunks.push(Chunk {
                text: text.trim().to_string(),
                start_time: window_start.unwrap_or(entry.start),
                end_time: entry.end(),
                video_title: metadata.title.clone(),
                video_url: metadata.url.clone(),
                video_id: metadata.video_id.clone(),
            });

            // Carry the overlap portion into the next window
            let keep_from = window.len().saturating_sub(config.overlap_entries);
            window.drain(..keep_from);
            text = window
                .iter()
                .map(|e| e.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            window_start = window.first().map(|e| e.start);
        }
    }

    // Whatever is still accumulated becomes the final chunk
    if let (Some(start), Some(last)) = (window_start, window.last()) {
        chunks.push(Chunk {
            text: text.trim().to_string(),
            start_time: start,
            end_time: last.end(),
            video_title: metadata.title.clone(),
            video_url: metadata.url.clone(),
            video_id: metadata.video_id.clone(),
        });
    }

    chunks
}

/// Convert seconds to `HH:MM:SS`, zero-padded, truncating fractions.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> VideoMetadata {
        VideoMetadata {
            title: "Test Video".to_string(),
            url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
            video_id: "dQw4w9WgXcQ".to_string(),
            duration_seconds: 120,
            upload_date: "20240101".to_string(),
        }
    }

    #[test]
    fn test_two_entry_window_with_trailing_overlap() {
        let entries = vec![
            CaptionEntry::new("a b c", 0.0, 5.0),
            CaptionEntry::new("d e f", 5.0, 5.0),
        ];
        let config = ChunkingConfig {
            target_word_count: 4,
            overlap_entries: 1,
        };

        let chunks = chunk_entries(&entries, &meta(), &config);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "a b c d e f");
        assert_eq!(chunks[0].start_time, 0.0);
        assert_eq!(chunks[0].end_time, 10.0);

        // The last entry of the closed window carries forward and is
        // emitted as the trailing remainder.
        assert_eq!(chunks[1].text, "d e f");
        assert_eq!(chunks[1].start_time, 5.0);
        assert_eq!(chunks[1].end_time, 10.0);
    }

    #[test]
    fn test_overlap_seeds_next_window() {
        let entries = vec![
            CaptionEntry::new("one two", 0.0, 2.0),
            CaptionEntry::new("three four", 2.0, 2.0),
            CaptionEntry::new("five six", 4.0, 2.0),
            CaptionEntry::new("seven eight", 6.0, 2.0),
        ];
        let config = ChunkingConfig {
            target_word_count: 4,
            overlap_entries: 1,
        };

        let chunks = chunk_entries(&entries, &meta(), &config);

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].text, "one two three four");
        // Second window starts from the carried-over entry
        assert_eq!(chunks[1].text, "three four five six");
        assert_eq!(chunks[1].start_time, 2.0);
        assert_eq!(chunks[2].text, "five six seven eight");
        // Overlap-only remainder still comes out as a final chunk
        assert_eq!(chunks[3].text, "seven eight");
        assert_eq!(chunks[3].start_time, 6.0);
    }

    #[test]
    fn test_no_text_lost() {
        let entries: Vec<CaptionEntry> = (0..50)
            .map(|i| CaptionEntry::new(format!("word{} word{}b", i, i), i as f64, 1.0))
            .collect();
        let config = ChunkingConfig {
            target_word_count: 10,
            overlap_entries: 2,
        };

        let chunks = chunk_entries(&entries, &meta(), &config);

        // Every source word appears in at least one chunk
        let all_text: String = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
        for entry in &entries {
            for word in entry.text.split_whitespace() {
                assert!(all_text.contains(word), "lost word: {}", word);
            }
        }
    }

    #[test]
    fn test_end_time_never_before_start_time() {
        let entries: Vec<CaptionEntry> = (0..30)
            .map(|i| CaptionEntry::new("a b c", i as f64 * 2.0, 2.0))
            .collect();
        let config = ChunkingConfig {
            target_word_count: 9,
            overlap_entries: 1,
        };

        for chunk in chunk_entries(&entries, &meta(), &config) {
            assert!(chunk.end_time >= chunk.start_time);
        }
    }

    #[test]
    fn test_short_input_emits_single_chunk() {
        let entries = vec![CaptionEntry::new("just a few words", 1.5, 3.0)];
        let chunks = chunk_entries(&entries, &meta(), &ChunkingConfig::default());

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "just a few words");
        assert_eq!(chunks[0].start_time, 1.5);
        assert_eq!(chunks[0].end_time, 4.5);
    }

    #[test]
    fn test_empty_input() {
        let chunks = chunk_entries(&[], &meta(), &ChunkingConfig::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_format_timestamp_truncates() {
        assert_eq!(format_timestamp(3725.9), "01:02:05");
        assert_eq!(format_timestamp(0.0), "00:00:00");
        assert_eq!(format_timestamp(59.999), "00:00:59");
        assert_eq!(format_timestamp(36_610.0), "10:10:10");
    }

    #[test]
    fn test_timestamp_range() {
        let chunk = Chunk {
            text: "x".to_string(),
            start_time: 65.0,
            end_time: 125.4,
            video_title: String::new(),
            video_url: String::new(),
            video_id: String::new(),
        };
        assert_eq!(chunk.timestamp_range(), "00:01:05 - 00:02:05");
    }
}
