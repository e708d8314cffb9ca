//! Configuration module for Spole.
//!
//! Handles loading and managing application settings.

mod settings;

pub use settings::{
    ChunkingSettings, EmbeddingSettings, GeneralSettings, ProcessingSettings, RagSettings,
    Settings, VectorStoreSettings,
};
