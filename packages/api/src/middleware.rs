//! Boundary handlers: panic recovery and the JSON 404 fallback

use axum::{http::StatusCode, response::Response};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use crate::error::{error_response, AppError};

/// Create a panic handler that returns the standard error body
pub fn create_panic_handler(
) -> CatchPanicLayer<fn(Box<dyn std::any::Any + Send + 'static>) -> Response> {
    CatchPanicLayer::custom(handle_panic)
}

/// Handle panic with proper logging and sanitized response
fn handle_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    // Extract panic message safely
    let panic_message = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic occurred"
    };

    error!(panic_message = %panic_message, "Handler panicked");

    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

/// Fallback for routes that don't exist
pub async fn not_found() -> AppError {
    AppError::NotFound
}
