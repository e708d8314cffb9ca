//! CLI module for Spole.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Spole - YouTube Transcript RAG
///
/// A CLI tool for turning YouTube transcripts into a searchable knowledge base.
/// The name "Spole" comes from the Norwegian word for "rewind."
#[derive(Parser, Debug)]
#[command(name = "spole")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, chunk, and save transcripts for a list of video URLs
    Process {
        /// Text file with one YouTube URL per line (# comments allowed)
        url_file: String,

        /// Maximum number of videos to process concurrently
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Output chunk-set file
        #[arg(short, long, default_value = "processed_videos.json")]
        output: String,
    },

    /// Ingest a saved chunk set into the vector store
    Ingest {
        /// Chunk-set file produced by `spole process`
        chunk_file: String,

        /// Collection to ingest into
        #[arg(long)]
        collection: Option<String>,

        /// Number of chunks per add call
        #[arg(long)]
        batch_size: Option<usize>,
    },

    /// Query the vector store for relevant transcript chunks
    Query {
        /// Search query
        query: String,

        /// Number of results
        #[arg(short, long)]
        n_results: Option<usize>,

        /// Summarize the retrieved context with an LLM
        #[arg(short, long)]
        summarize: bool,
    },

    /// Start the HTTP query API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },

    /// Find videos on a channel whose titles match a search term
    Discover {
        /// Channel or playlist URL
        channel_url: String,

        /// Case-insensitive term the title must contain
        search_term: String,

        /// Write matching video URLs to this file (one per line)
        #[arg(short, long)]
        output: Option<String>,

        /// Maximum number of channel videos to scan
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "chunking.target_word_count")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}
