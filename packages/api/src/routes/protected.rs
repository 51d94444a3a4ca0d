// ABOUTME: Example route guarded by the X-API-Key check
// ABOUTME: Copy this shape for any handler that needs authentication

use axum::Json;

use crate::deps::ApiKey;
use crate::models::{ErrorResponse, MessageResponse};

#[utoipa::path(
    get,
    path = "/protected",
    tag = "auth",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Caller presented the configured API key", body = MessageResponse),
        (status = 401, description = "Missing or wrong X-API-Key header", body = ErrorResponse),
        (status = 503, description = "API_KEY is not configured", body = ErrorResponse)
    )
)]
pub async fn protected(_: ApiKey) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "You have access".to_string(),
    })
}
