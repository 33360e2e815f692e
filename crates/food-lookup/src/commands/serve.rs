//! Serve command: run the HTTP server.

use std::sync::Arc;

use clap::Args;
use food_lookup_core::{Config, Engine};
use tracing::{debug, instrument};

use crate::http::{self, AppState};

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Address to listen on (default: the configured `bind`, else 0.0.0.0:8080).
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,
}

/// Serve `/search`, `/suggest` and `/healthz` until Ctrl-C.
#[instrument(name = "cmd_serve", skip_all)]
pub async fn cmd_serve(args: ServeArgs, config: &Config, engine: Engine) -> anyhow::Result<()> {
    let bind = args.bind.as_deref().unwrap_or_else(|| config.bind());
    debug!(%bind, "executing serve command");

    let state = Arc::new(AppState::new(engine, config.access_token()));
    http::serve(state, bind).await
}
