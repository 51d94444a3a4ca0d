// ABOUTME: Error type shared by all service bindings
// ABOUTME: Carries a stable kind label so callers can report failures without details

use edgeapi_http::HttpError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("Binding unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Invalid binding response: {0}")]
    Decode(String),

    #[error(transparent)]
    Http(#[from] HttpError),
}

impl BindingError {
    /// Short, fixed label for the failure. Safe to put in responses.
    pub fn kind(&self) -> &'static str {
        match self {
            BindingError::Unavailable(_) => "unavailable",
            BindingError::Query(_) => "query",
            BindingError::Decode(_) => "decode",
            BindingError::Http(err) if err.is_timeout() => "timeout",
            BindingError::Http(HttpError::Upstream { .. }) => "upstream",
            BindingError::Http(HttpError::Decode(_)) => "decode",
            BindingError::Http(_) => "unavailable",
        }
    }
}

impl From<sqlx::Error> for BindingError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(_)
            | sqlx::Error::RowNotFound
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::TypeNotFound { .. } => BindingError::Query(err.to_string()),
            _ => BindingError::Unavailable(err.to_string()),
        }
    }
}
