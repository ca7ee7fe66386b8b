//! precache server entry point.
//!
//! Boots the cache router host and serves its triggers as MCP tools on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use precache_client::{FetchClient, FetchConfig};
use precache_core::{AppConfig, CacheDb};
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

    let config = AppConfig::load().context("loading configuration")?;
    tracing::info!(
        cache_name = %config.cache_name,
        scope = %config.scope,
        db_path = %config.db_path.display(),
        "starting precache server on stdio transport"
    );

    let storage = Arc::new(CacheDb::open(&config.db_path).await?);
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let state = Arc::new(handler::AppState::new(config, storage, network));

    if state.config.install_on_start
        && let Err(e) = state.deploy().await
    {
        tracing::error!(error = %e, "install on start failed; previous generation stays current");
    }

    let handler = handler::PrecacheServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
