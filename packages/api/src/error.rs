use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use edgeapi_bindings::BindingError;
use edgeapi_http::HttpError;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::models::ErrorResponse;

/// Main application error type that all handlers should return
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unauthorized: {0}")]
    Unauthorized(&'static str),

    /// Required configuration or binding is missing
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(&'static str),

    #[error("Resource not found")]
    NotFound,

    #[error(transparent)]
    Upstream(#[from] HttpError),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }

    /// Status code and sanitized detail for the response body
    fn to_status_and_detail(&self) -> (StatusCode, String) {
        match self {
            AppError::Unauthorized(detail) => (StatusCode::UNAUTHORIZED, detail.to_string()),
            AppError::ServiceUnavailable(detail) => {
                (StatusCode::SERVICE_UNAVAILABLE, detail.to_string())
            }
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Upstream(HttpError::Upstream { status }) => {
                // only 4xx and 5xx are forwarded
                let code = StatusCode::from_u16(status.as_u16())
                    .ok()
                    .filter(|code| code.is_client_error() || code.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                (code, format!("Upstream API error: {}", status))
            }
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "Upstream request failed".to_string()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

impl From<BindingError> for AppError {
    fn from(err: BindingError) -> Self {
        match err {
            BindingError::Http(http) => AppError::Upstream(http),
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = self.to_status_and_detail();

        // Log internal errors with full context but don't expose details
        match &self {
            AppError::Internal(err) => {
                error!(error = ?err, "Internal server error occurred");
            }
            AppError::Upstream(err) => {
                warn!(error = %err, status = %status, "Upstream call failed");
            }
            _ => {
                info!(status = %status, error = %self, "API error response");
            }
        }

        error_response(status, detail)
    }
}

/// Build the standard `{detail, status_code}` response
pub fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    let body = ErrorResponse {
        detail: detail.into(),
        status_code: status.as_u16(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgeapi_http::StatusCode as UpstreamStatus;
    use rstest::rstest;

    #[test]
    fn test_unauthorized_status() {
        let (status, detail) = AppError::Unauthorized("Invalid or missing API key").to_status_and_detail();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(detail, "Invalid or missing API key");
    }

    #[test]
    fn test_service_unavailable_status() {
        let (status, _) = AppError::ServiceUnavailable("API key not configured").to_status_and_detail();
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_upstream_status_is_forwarded() {
        let error = AppError::from(HttpError::Upstream {
            status: UpstreamStatus::NOT_FOUND,
        });
        let (status, detail) = error.to_status_and_detail();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(detail, "Upstream API error: 404 Not Found");
    }

    #[rstest]
    #[case(UpstreamStatus::NOT_MODIFIED)]
    #[case(UpstreamStatus::FOUND)]
    #[case(UpstreamStatus::CONTINUE)]
    fn test_non_error_upstream_status_becomes_bad_gateway(#[case] upstream: UpstreamStatus) {
        let error = AppError::from(HttpError::Upstream { status: upstream });
        let (status, detail) = error.to_status_and_detail();
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(detail, format!("Upstream API error: {}", upstream));
    }

    #[tokio::test]
    async fn test_not_modified_upstream_keeps_error_body() {
        let response = AppError::from(HttpError::Upstream {
            status: UpstreamStatus::NOT_MODIFIED,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.status_code, 502);
        assert_eq!(body.detail, "Upstream API error: 304 Not Modified");
    }

    #[test]
    fn test_internal_message_sanitization() {
        let internal_error = AppError::internal(anyhow::anyhow!(
            "Database connection failed with password xyz"
        ));
        let (status, detail) = internal_error.to_status_and_detail();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(detail, "Internal server error");
        assert!(!detail.contains("password"));
        assert!(!detail.contains("xyz"));
    }

    #[test]
    fn test_binding_errors_map_by_origin() {
        let query = AppError::from(BindingError::Query("no such table: secrets".into()));
        assert!(matches!(query, AppError::Internal(_)));

        let upstream = AppError::from(BindingError::Http(HttpError::Upstream {
            status: UpstreamStatus::TOO_MANY_REQUESTS,
        }));
        assert_eq!(upstream.to_status_and_detail().0, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_response_body_shape() {
        let response = AppError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            ErrorResponse {
                detail: "Not Found".to_string(),
                status_code: 404
            }
        );
    }
}
