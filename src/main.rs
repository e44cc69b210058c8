//! CyberKids · static site backend
//!
//! - `GET /api/health`, `GET /api/info`
//! - Static SPA from STATIC_DIR with index.html fallback
//! - Graceful shutdown on SIGINT/SIGTERM
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   HOST             : bind address (default 0.0.0.0)
//!   STATIC_DIR       : built front-end bundle (default ./static)
//!   APP_ENV          : development | production | test
//!   SITE_CONFIG_PATH : TOML with site overrides and extra quiz questions
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use cyberkids_backend::config::ServerConfig;
use cyberkids_backend::routes::build_router;
use cyberkids_backend::state::AppState;
use cyberkids_backend::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let config = ServerConfig::from_env();
  let addr = config.addr();
  let environment = config.environment;

  let state = Arc::new(AppState::new(config));
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "cyberkids_backend", %addr, %environment, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "cyberkids_backend", "Server stopped");
  Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
  let ctrl_c = async {
    if let Err(e) = tokio::signal::ctrl_c().await {
      tracing::error!(target: "cyberkids_backend", error = %e, "Failed to listen for Ctrl-C");
      std::future::pending::<()>().await;
    }
  };

  #[cfg(unix)]
  let terminate = async {
    match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
      Ok(mut sig) => { sig.recv().await; }
      Err(e) => {
        tracing::error!(target: "cyberkids_backend", error = %e, "Failed to listen for SIGTERM");
        std::future::pending::<()>().await;
      }
    }
  };

  #[cfg(not(unix))]
  let terminate = std::future::pending::<()>();

  tokio::select! {
    _ = ctrl_c => info!(target: "cyberkids_backend", "SIGINT received; shutting down"),
    _ = terminate => info!(target: "cyberkids_backend", "SIGTERM received; shutting down"),
  }
}
