//! Serve command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::server;
use anyhow::Result;

/// Run the serve command.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> Result<()> {
    Output::header("Spole API Server");
    println!();
    Output::kv("Endpoint", &format!("http://{}:{}", host, port));
    Output::kv("Health", "GET  /api/health");
    Output::kv("Query", "POST /api/query");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    // run_server logs once the listener is bound; a bind failure (port in
    // use, bad host) surfaces here as the command's error.
    server::run_server(host, port, settings).await?;

    Ok(())
}
