// ABOUTME: HTTP API layer for edgeapi workers: routes, extractors and error handling
// ABOUTME: Has no host-specific code, so the router can be driven directly in tests

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use edgeapi_bindings::Env;
use tower_http::trace::TraceLayer;

pub mod deps;
pub mod docs;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;

#[cfg(test)]
mod tests;

pub use deps::{verify_api_key, ApiKey, Db, Kv, Settings, WorkerEnv, API_KEY_HEADER};
pub use error::AppError;
pub use models::{CheckStatus, ErrorResponse, HealthResponse, OverallStatus, ServiceCheck};
pub use routes::health::run_checks;

/// Build the application router.
///
/// Requests must carry a [`WorkerEnv`] extension (see [`with_env`]) before
/// any route that reads settings is reached.
pub fn create_router() -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/protected", get(routes::protected::protected))
        .route(docs::OPENAPI_PATH, get(docs::openapi_json))
        .route("/docs", get(docs::swagger_ui))
        .route("/redoc", get(docs::redoc))
        .fallback(middleware::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::create_panic_handler())
}

/// Attach `env` to every request that passes through `router`
pub fn with_env(router: Router, env: Arc<dyn Env>) -> Router {
    router.layer(Extension(WorkerEnv(env)))
}
