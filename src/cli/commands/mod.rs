//! CLI command implementations.

mod config;
mod discover;
mod ingest;
mod process;
mod query;
mod serve;

pub use config::run_config;
pub use discover::run_discover;
pub use ingest::run_ingest;
pub use process::run_process;
pub use query::run_query;
pub use serve::run_serve;
