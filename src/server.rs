//! MCP server initialization for stdio and streamable HTTP transports.
//!
//! Provides [`serve`], which picks [`serve_stdio`] or [`serve_http`] from the
//! configured transport and wires the memory service into the MCP tool handler.

use crate::tools::HippoTools;
use anyhow::{bail, Result};
use hippocampus::config::HippoConfig;
use hippocampus::memory::MemoryService;
use rmcp::ServiceExt;
use std::future::Future;
use std::sync::Arc;

/// Shared setup: build the memory service. Role stores open lazily on first use.
fn setup_shared_state(config: HippoConfig) -> (Arc<MemoryService>, Arc<HippoConfig>) {
    let memory = MemoryService::from_config(&config);
    match memory.memory_dir() {
        Some(dir) => tracing::info!(memory_dir = %dir.display(), "memory service ready"),
        None => tracing::info!("memory service ready (in-memory only)"),
    }
    (Arc::new(memory), Arc::new(config))
}

/// Start the server on the configured transport (`stdio` or `http`).
pub async fn serve(config: HippoConfig) -> Result<()> {
    match config.server.transport.as_str() {
        "stdio" => serve_stdio(config).await,
        "http" => serve_http(config).await,
        other => bail!("unknown transport: {other}. Supported: stdio, http"),
    }
}

/// Start the MCP server over stdio transport.
pub async fn serve_stdio(config: HippoConfig) -> Result<()> {
    tracing::info!("starting hippocampus MCP server on stdio");

    let (memory, config) = setup_shared_state(config);

    let tools = HippoTools::new(memory, config);
    let transport = rmcp::transport::stdio();

    let server = tools.serve(transport).await?;
    tracing::info!("MCP server running, waiting for client");

    server.waiting().await?;
    tracing::info!("MCP server shut down");

    Ok(())
}

/// Start the MCP server over Streamable HTTP transport.
pub async fn serve_http(config: HippoConfig) -> Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let bind_addr = format!("{host}:{port}");

    tracing::info!(addr = %bind_addr, "starting hippocampus MCP server on HTTP");

    let (memory, config) = setup_shared_state(config);

    let service = rmcp::transport::streamable_http_server::StreamableHttpService::new(
        move || Ok(HippoTools::new(memory.clone(), config.clone())),
        rmcp::transport::streamable_http_server::session::local::LocalSessionManager::default()
            .into(),
        Default::default(),
    );

    let router = axum::Router::new().nest_service("/mcp", service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "MCP server listening at http://{bind_addr}/mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_on(tokio::signal::ctrl_c()))
        .await?;

    Ok(())
}

/// Resolve once `signal` fires. If the signal cannot be listened for, log it
/// and never resolve, so the server keeps running until the process is killed.
async fn shutdown_on<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "failed to listen for ctrl-c; stop the server by killing the process");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down HTTP server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_fires_with_the_signal() {
        let fired = tokio::time::timeout(Duration::from_millis(100), shutdown_on(async { Ok::<(), std::io::Error>(()) })).await;
        assert!(fired.is_ok());
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_serving() {
        let broken = async { Err::<(), _>(std::io::Error::other("no signal handler")) };
        let fired = tokio::time::timeout(Duration::from_millis(100), shutdown_on(broken)).await;
        assert!(fired.is_err(), "shutdown must not trigger when ctrl-c cannot be observed");
    }
}
