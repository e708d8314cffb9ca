//! Ingest command implementation.

use crate::chunkset;
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::OpenAIEmbedder;
use crate::ingest::Ingestor;
use crate::vector_store::SqliteVectorStore;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// Run the ingest command.
pub async fn run_ingest(
    chunk_file: &str,
    collection: Option<String>,
    batch_size: Option<usize>,
    settings: Settings,
) -> Result<()> {
    Output::info(&format!("Loading chunks from {}", chunk_file));
    let chunks = chunkset::load(Path::new(chunk_file))?;
    Output::info(&format!("Loaded {} chunks", chunks.len()));

    let collection = collection.unwrap_or_else(|| settings.vector_store.collection.clone());
    let batch_size = batch_size.unwrap_or(settings.vector_store.batch_size);

    let store = Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?);
    let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding));

    let ingestor = Ingestor::new(store, embedder, collection.clone(), batch_size);

    let spinner = Output::spinner("Ingesting...");
    let committed = ingestor.ingest(&chunks).await?;
    spinner.finish_and_clear();

    if committed == 0 {
        Output::success(&format!(
            "Collection '{}' is already up to date ({} chunks)",
            collection,
            chunks.len()
        ));
    } else {
        Output::success(&format!(
            "Ingested {} chunks into collection '{}'",
            committed, collection
        ));
    }

    Ok(())
}
