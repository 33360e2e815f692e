//! MCP command: serve the lookup tools over stdio.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use food_lookup_core::Engine;
use rmcp::ServiceExt;
use rmcp::transport::stdio;
use tracing::{info, instrument};

use crate::server::FoodServer;

/// Arguments for the `mcp` subcommand.
#[derive(Args, Debug, Default)]
pub struct McpArgs {}

/// Run the MCP server until the client disconnects.
#[instrument(name = "cmd_mcp", skip_all)]
pub async fn cmd_mcp(_args: McpArgs, engine: Engine) -> anyhow::Result<()> {
    info!(entries = engine.catalog().len(), "starting MCP server on stdio");
    let service = FoodServer::new(Arc::new(engine))
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;
    service.waiting().await.context("MCP server failed")?;
    info!("MCP server stopped");
    Ok(())
}
