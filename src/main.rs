//! Spole CLI entry point.

use anyhow::Result;
use clap::Parser;
use spole::cli::{commands, Cli, Commands};
use spole::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("spole={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    // Ensure data directory exists
    std::fs::create_dir_all(settings.data_dir())?;

    // Execute command
    match &cli.command {
        Commands::Process {
            url_file,
            max_concurrent,
            output,
        } => {
            commands::run_process(url_file, *max_concurrent, output, settings).await?;
        }

        Commands::Ingest {
            chunk_file,
            collection,
            batch_size,
        } => {
            commands::run_ingest(chunk_file, collection.clone(), *batch_size, settings).await?;
        }

        Commands::Query {
            query,
            n_results,
            summarize,
        } => {
            commands::run_query(query, *n_results, *summarize, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, *port, settings).await?;
        }

        Commands::Discover {
            channel_url,
            search_term,
            output,
            limit,
        } => {
            commands::run_discover(channel_url, search_term, output.clone(), *limit).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings)?;
        }
    }

    Ok(())
}
