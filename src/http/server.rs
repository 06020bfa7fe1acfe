//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the example endpoint
//! - Wire up middleware (tracing, timeout)
//! - Bind server to listener and stop on the shutdown broadcast

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::resolve::{ResolveError, Resolver};

/// Import alias called by the index handler.
pub const WRITE_LOG_ALIAS: &str = "write_log";
/// Path alias reported by the index handler.
pub const LOG_PATH_ALIAS: &str = "log_writer";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
}

/// HTTP surface exercising the resolvers.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        let router = Self::build_router(AppState { resolver });
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", get(index))
            .with_state(state)
            .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for serving or for driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until a shutdown broadcast arrives.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub message: &'static str,
    pub log_path: String,
}

/// Resolver failure surfaced as a 500 with a JSON body.
#[derive(Debug)]
pub struct ApiError(String);

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        ApiError(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(serde_json::json!({ "error": self.0 }))).into_response()
    }
}

async fn index(State(state): State<AppState>) -> Result<Json<IndexResponse>, ApiError> {
    let write_log = state.resolver.resolve_import(WRITE_LOG_ALIAS)?;
    write_log
        .call(&[Value::from("Handling request to /")])
        .map_err(|e| ApiError(format!("{:#}", e)))?;

    let log_path = state.resolver.resolve_path(LOG_PATH_ALIAS)?;
    Ok(Json(IndexResponse {
        message: "Hello, world!",
        log_path: log_path.display().to_string(),
    }))
}
