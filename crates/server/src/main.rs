//! fire-guide server entry point.
//!
//! Boots the offline guide: opens the response cache, registers the caching
//! worker in front of the HTTP client, and serves the page controller as MCP
//! tools on stdio. Logging goes to stderr to avoid interfering with the
//! JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use fireguide_client::{
    CachingWorker, FetchClient, FetchConfig, Network, PdfPageCounter, ViewController, WorkerConfig, connect,
};
use fireguide_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let origin = config.origin_url()?;

    tracing::info!(
        origin = %origin,
        cache_name = %config.cache_name,
        db_path = %config.db_path.display(),
        "Starting fire-guide server on stdio transport"
    );

    let cache = CacheDb::open(&config.db_path).await?;
    let network: Arc<dyn Network> = Arc::new(FetchClient::new(origin.clone(), FetchConfig::from_app(&config))?);
    let worker = CachingWorker::new(cache.clone(), network, WorkerConfig::from_app(&config)?);

    // Falls back to the plain network path if registration fails.
    let fetcher = connect(&config.worker_path, worker).await;

    let view = ViewController::new(
        origin.clone(),
        config.pages.clone(),
        config.home_page.clone(),
        fetcher,
        Arc::new(PdfPageCounter),
    )?;

    let handler = handler::GuideServer::new(view, cache, config.cache_name.clone(), origin);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
