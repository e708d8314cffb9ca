//! Query command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::rag::QueryEngine;
use crate::vector_store::SqliteVectorStore;
use anyhow::Result;
use std::sync::Arc;

/// Run the query command.
pub async fn run_query(
    query: &str,
    n_results: Option<usize>,
    summarize: bool,
    settings: Settings,
) -> Result<()> {
    let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
    let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding));

    let engine = QueryEngine::new(
        store,
        embedder,
        settings.vector_store.collection.clone(),
        &settings.rag,
    );

    let n_results = n_results.unwrap_or(settings.rag.n_results);

    if summarize && settings.rag.enabled {
        let spinner = Output::spinner("Searching and summarizing...");
        let answer = engine.summarize(query, n_results).await;
        spinner.finish_and_clear();

        match answer {
            Ok(rag) => {
                Output::header("Answer");
                println!("{}\n", rag.answer);

                if !rag.sources.is_empty() {
                    Output::header("Sources");
                    for source in &rag.sources {
                        Output::query_result(
                            source.relevance_rank,
                            &source.video_title,
                            &source.timestamp,
                            &source.video_url,
                            &source.text,
                        );
                    }
                }
            }
            Err(e) => {
                Output::error(&format!("Query failed: {}", e));
                return Err(e.into());
            }
        }

        return Ok(());
    }

    let spinner = Output::spinner("Searching...");
    let results = engine.query(query, n_results).await;
    spinner.finish_and_clear();

    match results {
        Ok(results) if results.is_empty() => {
            Output::warning("No results found matching your query.");
        }
        Ok(results) => {
            Output::success(&format!("Found {} results", results.len()));
            for result in &results {
                Output::query_result(
                    result.relevance_rank,
                    &result.video_title,
                    &result.timestamp,
                    &result.video_url,
                    &result.text,
                );
            }
        }
        Err(e) => {
            Output::error(&format!("Query failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
