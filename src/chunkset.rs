//! Durable chunk-set serialization.
//!
//! A chunk set is the flat ordered sequence of chunks across all processed
//! videos, saved as JSON. It is the handoff between the processing pipeline
//! and vector-store ingestion, so the round-trip must be field-identical.

use crate::chunking::Chunk;
use crate::error::Result;
use crate::pipeline::VideoResult;
use std::path::Path;
use tracing::info;

/// Flatten per-video chunk lists into one ordered sequence.
///
/// Chunk order within each video is preserved; videos appear in the order
/// the results were collected.
pub fn flatten(results: &[VideoResult]) -> Vec<Chunk> {
    results
        .iter()
        .flat_map(|result| result.chunks.iter().cloned())
        .collect()
}

/// Save a chunk set to a JSON file.
pub fn save(path: &Path, chunks: &[Chunk]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(chunks)?;
    std::fs::write(path, json)?;

    info!("Saved {} chunks to {}", chunks.len(), path.display());
    Ok(())
}

/// Load a chunk set from a JSON file.
///
/// A missing or corrupt file is an error for the caller to handle.
pub fn load(path: &Path) -> Result<Vec<Chunk>> {
    let content = std::fs::read_to_string(path)?;
    let chunks: Vec<Chunk> = serde_json::from_str(&content)?;
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ProcessedMeta;
    use chrono::Utc;

    fn chunk(text: &str, start: f64, end: f64) -> Chunk {
        Chunk {
            text: text.to_string(),
            start_time: start,
            end_time: end,
            video_title: "Title".to_string(),
            video_url: "https://youtu.be/abc123def45".to_string(),
            video_id: "abc123def45".to_string(),
        }
    }

    #[test]
    fn test_round_trip_is_field_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");

        let chunks = vec![chunk("first", 0.0, 12.5), chunk("second", 10.0, 25.75)];
        save(&path, &chunks).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded, chunks);
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(chunk("t", 1.0, 2.0)).unwrap();
        let obj = json.as_object().unwrap();

        for field in ["text", "start_time", "end_time", "video_title", "video_url", "video_id"] {
            assert!(obj.contains_key(field), "missing field: {}", field);
        }
        assert_eq!(obj.len(), 6);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_flatten_preserves_order() {
        let meta = ProcessedMeta {
            title: "Title".to_string(),
            url: "u".to_string(),
            video_id: "v".to_string(),
            duration_seconds: 10,
            upload_date: String::new(),
            processed_date: Utc::now(),
        };

        let results = vec![
            VideoResult {
                metadata: meta.clone(),
                chunks: vec![chunk("a", 0.0, 1.0), chunk("b", 1.0, 2.0)],
            },
            VideoResult {
                metadata: meta,
                chunks: vec![chunk("c", 0.0, 1.0)],
            },
        ];

        let flat = flatten(&results);
        let texts: Vec<&str> = flat.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c"]);
    }
}
