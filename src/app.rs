//! Application assembly: store construction, routes, static files, middleware.

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::{ServerConfig, StorageKind};
use crate::error::ConfigError;
use crate::store::{JsonFileBackend, MemoryBackend, TodoBackend};
use crate::todos::TodoStore;
use crate::todos::routes::{TodoRouteState, todo_routes};
use crate::todos::ws::todo_ws_routes;

/// Create the todo store for the configured backend.
pub fn build_store(config: &ServerConfig) -> Arc<TodoStore> {
    let backend: Arc<dyn TodoBackend> = match config.storage {
        StorageKind::File => Arc::new(JsonFileBackend::new(config.data_path.clone())),
        StorageKind::Memory => Arc::new(MemoryBackend::new()),
    };
    TodoStore::new(backend)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "todo-api"
    }))
}

/// CORS for the configured origins; any origin when none are configured.
pub fn build_cors_layer(config: &ServerConfig) -> Result<CorsLayer, ConfigError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE]);

    if config.cors_origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|e| ConfigError::InvalidValue {
                    key: "TODO_API_CORS_ORIGINS".into(),
                    message: format!("{o:?}: {e}"),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(origins))
}

/// Build the full application [`Router`] around an existing store.
pub fn build_router(store: Arc<TodoStore>, config: &ServerConfig) -> Result<Router, ConfigError> {
    let index = config.static_dir.join(&config.index_file);

    let app = Router::new()
        .route("/health", get(health))
        .route_service("/", ServeFile::new(index))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .merge(todo_routes(TodoRouteState {
            store: Arc::clone(&store),
        }))
        .merge(todo_ws_routes(store))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(build_cors_layer(config)?);

    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn config_for(dir: &TempDir) -> ServerConfig {
        ServerConfig {
            storage: StorageKind::Memory,
            static_dir: dir.path().to_path_buf(),
            ..ServerConfig::default()
        }
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let resp = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn root_serves_index_page() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Todos</h1>").unwrap();
        let config = config_for(&dir);
        let app = build_router(build_store(&config), &config).unwrap();

        let (status, body) = get_body(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Todos</h1>");
    }

    #[tokio::test]
    async fn static_files_are_served() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log('hi');").unwrap();
        let config = config_for(&dir);
        let app = build_router(build_store(&config), &config).unwrap();

        let (status, body) = get_body(app.clone(), "/static/app.js").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("console.log"));

        let (status, _) = get_body(app, "/static/missing.css").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let dir = TempDir::new().unwrap();
        let config = config_for(&dir);
        let app = build_router(build_store(&config), &config).unwrap();

        let (status, body) = get_body(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[test]
    fn invalid_cors_origin_is_rejected() {
        let config = ServerConfig {
            cors_origins: vec!["bad\norigin".into()],
            ..ServerConfig::default()
        };
        assert!(build_cors_layer(&config).is_err());
    }
}
