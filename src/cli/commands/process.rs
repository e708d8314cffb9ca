//! Process command implementation.
//!
//! Reads a URL file, fetches and chunks every video concurrently, and saves
//! the flattened chunk set.

use crate::chunking::ChunkingConfig;
use crate::chunkset;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::{read_urls_from_file, Pipeline};
use crate::transcript::YoutubeFetcher;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Run the process command.
pub async fn run_process(
    url_file: &str,
    max_concurrent: Option<usize>,
    output: &str,
    settings: Settings,
) -> Result<()> {
    let urls = read_urls_from_file(Path::new(url_file))?;

    if urls.is_empty() {
        Output::warning("No valid URLs found in file");
        return Ok(());
    }

    Output::info(&format!("Found {} URLs to process", urls.len()));

    let chunking = ChunkingConfig {
        target_word_count: settings.chunking.target_word_count,
        overlap_entries: settings.chunking.overlap_entries,
    };
    let pipeline = Pipeline::new(
        Arc::new(YoutubeFetcher::new()),
        chunking,
        settings.processing.language.clone(),
    );

    let max_concurrent = max_concurrent.unwrap_or(settings.processing.max_concurrent);

    let spinner = Output::spinner(&format!(
        "Processing {} videos ({} concurrent)...",
        urls.len(),
        max_concurrent
    ));
    let results = pipeline.process_videos(&urls, max_concurrent).await;
    spinner.finish_and_clear();

    let failed = urls.len() - results.len();
    if failed > 0 {
        Output::warning(&format!("{} videos failed and were dropped", failed));
    }

    if results.is_empty() {
        Output::error("No videos could be processed");
        return Err(anyhow::anyhow!("No videos could be processed"));
    }

    let chunks = chunkset::flatten(&results);
    chunkset::save(Path::new(output), &chunks)?;

    Output::success(&format!(
        "Processed {} videos successfully ({} chunks)",
        results.len(),
        chunks.len()
    ));
    Output::info(&format!("Saved chunk set to {}", output));
    println!();

    for result in &results {
        Output::video_info(
            &result.metadata.title,
            &result.metadata.video_id,
            result.chunks.len(),
            result.metadata.duration_seconds,
        );
    }

    Ok(())
}
