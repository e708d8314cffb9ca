//! Spole - YouTube Transcript RAG
//!
//! A CLI tool for turning YouTube transcripts into a searchable knowledge base.
//!
//! The name "Spole" comes from the Norwegian word for "rewind" — the tool
//! rewinds you to the exact timestamp where something was said.
//!
//! # Overview
//!
//! Spole allows you to:
//! - Fetch captions and metadata for YouTube videos
//! - Chunk transcripts into overlapping, timestamped windows
//! - Process whole URL lists concurrently and save the result as a chunk set
//! - Ingest chunk sets into a vector database in batches
//! - Query the database by similarity, with optional AI summarization
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `transcript` - Caption and metadata fetching (YouTube)
//! - `chunking` - Overlapping word-count chunking
//! - `pipeline` - Concurrent multi-video processing
//! - `chunkset` - Durable chunk-set serialization
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `ingest` - Batched ingestion into the vector store
//! - `rag` - Query formatting and LLM summarization
//! - `server` - HTTP query API
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spole::chunking::ChunkingConfig;
//! use spole::pipeline::Pipeline;
//! use spole::transcript::youtube::YoutubeFetcher;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let fetcher = Arc::new(YoutubeFetcher::new());
//!     let pipeline = Pipeline::new(fetcher, ChunkingConfig::default(), "en");
//!
//!     let urls = vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()];
//!     let results = pipeline.process_videos(&urls, 5).await;
//!     println!("Processed {} videos", results.len());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod chunkset;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod rag;
pub mod server;
pub mod transcript;
pub mod vector_store;

pub use error::{Result, SpoleError};
