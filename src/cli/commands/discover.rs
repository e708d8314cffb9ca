//! Discover command implementation.
//!
//! Lists videos on a channel or playlist whose titles contain a search term
//! and optionally writes the matching URLs to a file usable by `process`.

use crate::cli::Output;
use crate::transcript::YoutubeFetcher;
use anyhow::Result;

/// Run the discover command.
pub async fn run_discover(
    channel_url: &str,
    search_term: &str,
    output: Option<String>,
    limit: Option<usize>,
) -> Result<()> {
    let fetcher = YoutubeFetcher::new();

    if !fetcher.can_handle(channel_url) {
        Output::error("Input doesn't appear to be a valid YouTube channel or playlist URL");
        return Err(anyhow::anyhow!("Invalid channel URL"));
    }

    let spinner = Output::spinner("Fetching video list...");
    let videos = fetcher.list_videos(channel_url, limit).await?;
    spinner.finish_and_clear();

    let term = search_term.to_lowercase();
    let matching: Vec<_> = videos
        .iter()
        .filter(|v| v.title.to_lowercase().contains(&term))
        .collect();

    if matching.is_empty() {
        Output::warning(&format!(
            "No videos matching '{}' found ({} scanned)",
            search_term,
            videos.len()
        ));
        return Ok(());
    }

    Output::success(&format!(
        "Found {} matching videos ({} scanned)",
        matching.len(),
        videos.len()
    ));

    for video in &matching {
        Output::list_item(&video.title);
    }

    if let Some(output_path) = output {
        let contents: String = matching
            .iter()
            .map(|v| format!("{}\n", v.url))
            .collect();
        std::fs::write(&output_path, contents)?;
        Output::info(&format!("Saved video URLs to {}", output_path));
    }

    Ok(())
}
