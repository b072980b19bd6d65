mod cli;
mod config;
mod llm;
mod logging;
mod mcp;
mod utils;

#[cfg(test)]
mod tests;

use crate::cli::Args;
use crate::config::ServerConfig;
use crate::llm::AzureOpenAIClient;
use crate::logging::setup_logging;
use crate::mcp::{Dispatcher, MCPServer};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match &args.env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to load environment file {}", path.display()))?;
        }
        None => {
            dotenv::dotenv().ok();
        }
    }

    setup_logging(args.verbose);

    let config = ServerConfig::from_env()?.with_default_model(args.default_model);
    info!(
        "Using deployment {} at {}",
        config.deployment, config.endpoint
    );

    let backend = Arc::new(AzureOpenAIClient::new(&config));
    let dispatcher = Dispatcher::new(backend, config.default_model.clone());
    let mut server = MCPServer::new(dispatcher);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                shutdown.cancel();
            }
            Err(e) => error!("Failed to listen for interrupt signal: {}", e),
        }
    });

    server.run_stdio(cancel).await?;

    // The stdin reader may still be blocked on a background thread
    std::process::exit(0);
}
