//! HTTP endpoint handlers. Thin wrappers over `AppState`.

use std::sync::Arc;
use axum::{extract::State, response::Html, Json};
use tracing::{debug, instrument};

use crate::error::{ErrorResponse, ServerError};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> Json<HealthOut> {
  Json(HealthOut {
    status: HEALTH_OK.into(),
    app: state.site.name.clone(),
    version: env!("CARGO_PKG_VERSION").into(),
    timestamp: chrono::Utc::now().to_rfc3339(),
    environment: state.config.environment,
  })
}

#[instrument(level = "info", skip(state))]
pub async fn http_info(State(state): State<Arc<AppState>>) -> Json<InfoOut> {
  Json(InfoOut { site: state.site.clone(), quiz_questions: state.questions.len() })
}

/// Entry document of the SPA, served for every path without a static file so
/// the client-side router can take over.
#[instrument(level = "debug", skip(state))]
pub async fn spa_index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ErrorResponse> {
  let path = state.config.static_dir.join("index.html");
  match tokio::fs::read_to_string(&path).await {
    Ok(body) => {
      debug!(target: "cyberkids_backend", path = %path.display(), "SPA index served");
      Ok(Html(body))
    }
    Err(source) => Err(ErrorResponse::new(ServerError::Io { path, source }, state.config.environment)),
  }
}
