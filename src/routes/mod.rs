//! Router assembly: JSON endpoints, static SPA files, CORS, panic handling and
//! HTTP tracing.

use std::{any::Any, sync::Arc};

use axum::{
    body::Body,
    handler::Handler,
    http::Response,
    routing::get,
    Router,
};
use tower_http::{
    catch_panic::{CatchPanicLayer, ResponseForPanic},
    cors::{Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

use crate::config::Environment;
use crate::error::internal_error;
use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - `GET /api/health` and `GET /api/info`
/// - static files from `STATIC_DIR`, falling back to its `index.html`
/// - CORS (allow any origin/method/headers)
/// - panics turned into 500s (raw message only in development)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let environment = state.config.environment;

    // Static files; anything else gets the SPA entry document.
    let spa_index = http::spa_index.with_state(state.clone());
    let static_service = ServeDir::new(&state.config.static_dir)
        .append_index_html_on_directories(true)
        .fallback(spa_index);

    Router::new()
        .route("/api/health", get(http::http_health))
        .route("/api/info", get(http::http_info))
        .fallback_service(static_service)
        .with_state(state)
        .layer(catch_panic_layer(environment))
        .layer(
            CorsLayer::new()
                .allow_origin(AnyOrigin)
                .allow_methods(AnyOrigin)
                .allow_headers(AnyOrigin),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

pub fn catch_panic_layer(environment: Environment) -> CatchPanicLayer<PanicResponder> {
    CatchPanicLayer::custom(PanicResponder { environment })
}

#[derive(Clone, Copy, Debug)]
pub struct PanicResponder {
    environment: Environment,
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let message = if let Some(s) = err.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic".to_string()
        };
        error!(target: "cyberkids_backend", panic = %message, "Handler panicked");
        internal_error(self.environment, &message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::protocol::{HealthOut, InfoOut};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    const INDEX: &str = "<!doctype html><title>CyberKids</title><div id=\"root\"></div>";

    fn site_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), INDEX).unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/app.js"), "console.log('hi');").unwrap();
        dir
    }

    fn app(dir: &std::path::Path, environment: Environment) -> Router {
        let config = ServerConfig {
            static_dir: dir.to_path_buf(),
            environment,
            ..ServerConfig::default()
        };
        build_router(Arc::new(AppState::new(config)))
    }

    async fn get_path(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn health_reports_app_and_environment() {
        let dir = site_dir();
        let (status, body) = get_path(app(dir.path(), Environment::Production), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthOut = serde_json::from_str(&body).unwrap();
        assert_eq!(health.status, "OK");
        assert_eq!(health.app, "CyberKids");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(health.environment, Environment::Production);
        assert!(chrono::DateTime::parse_from_rfc3339(&health.timestamp).is_ok());
    }

    #[tokio::test]
    async fn info_describes_the_site() {
        let dir = site_dir();
        let (status, body) = get_path(app(dir.path(), Environment::Test), "/api/info").await;
        assert_eq!(status, StatusCode::OK);
        let info: InfoOut = serde_json::from_str(&body).unwrap();
        assert_eq!(info.site.name, "CyberKids");
        assert!(info.site.mobile_friendly);
        assert!(!info.site.features.is_empty());
        assert_eq!(info.quiz_questions, 5);

        let raw: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(raw.get("description").is_some());
        assert!(raw.get("tech").is_some());
    }

    #[tokio::test]
    async fn serves_static_assets() {
        let dir = site_dir();
        let (status, body) = get_path(app(dir.path(), Environment::Test), "/assets/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("console.log"));
    }

    #[tokio::test]
    async fn client_routes_get_the_index_document() {
        let dir = site_dir();
        for uri in ["/", "/quiz", "/tips/passwords"] {
            let (status, body) = get_path(app(dir.path(), Environment::Test), uri).await;
            assert_eq!(status, StatusCode::OK, "uri {uri}");
            assert_eq!(body, INDEX, "uri {uri}");
        }
    }

    #[tokio::test]
    async fn missing_index_is_500_with_details_only_in_development() {
        let dir = tempfile::tempdir().unwrap();

        let (status, body) = get_path(app(dir.path(), Environment::Development), "/quiz").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Something went wrong!");
        assert!(json["message"].as_str().unwrap().contains("index.html"));

        let (status, body) = get_path(app(dir.path(), Environment::Production), "/quiz").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Something went wrong!");
        assert!(json.get("message").is_none());
    }

    async fn boom() -> &'static str {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn panics_become_500() {
        let dev = Router::new().route("/boom", get(boom)).layer(catch_panic_layer(Environment::Development));
        let (status, body) = get_path(dev, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("kaboom"));

        let prod = Router::new().route("/boom", get(boom)).layer(catch_panic_layer(Environment::Production));
        let (status, body) = get_path(prod, "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.contains("kaboom"));
    }
}
