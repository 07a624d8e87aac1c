//! Trivia Forge · challenge generation backend
//!
//! - Axum admin HTTP API for generating trivia challenges
//! - Anthropic Messages integration (via environment variables)
//! - Compliance validation before anything is stored
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   ANTHROPIC_API_KEY     : enables generation if present
//!   ANTHROPIC_BASE_URL    : default "https://api.anthropic.com"
//!   ANTHROPIC_MODEL       : default "claude-sonnet-4-20250514"
//!   GENERATOR_CONFIG_PATH : path to TOML config (prompts + extra patterns)
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod patterns;
mod prompts;
mod parser;
mod validator;
mod anthropic;
mod pipeline;
mod store;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: pipeline (if a key is configured) and the challenge store.
  let state = Arc::new(AppState::from_env());

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "trivia_forge", %addr, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "trivia_forge", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "trivia_forge", error = %e, "Failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
}
