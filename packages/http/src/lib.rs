// ABOUTME: Outbound HTTP helper for worker handlers
// ABOUTME: Fresh client per call, fixed timeout, status-only upstream errors

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub use reqwest::{Method, StatusCode};

/// Timeout applied to every outbound call unless a caller opts into another one
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum HttpError {
    /// Upstream answered with a non-2xx status. The body is dropped on purpose.
    #[error("Upstream API error: {status}")]
    Upstream { status: StatusCode },

    #[error("Failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("Upstream request failed")]
    Transport(#[source] reqwest::Error),

    #[error("Upstream response was not valid JSON")]
    Decode(#[source] reqwest::Error),
}

impl HttpError {
    /// Upstream status code, if the failure came from a non-2xx response
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            HttpError::Upstream { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            HttpError::Transport(err) => err.is_timeout(),
            _ => false,
        }
    }
}

/// Build a fresh client with the default timeout.
///
/// Clients are never shared between calls: the edge host gives no guarantee
/// that a pooled connection is still usable on the next invocation.
pub fn client() -> Result<Client, HttpError> {
    client_with_timeout(DEFAULT_TIMEOUT)
}

/// Build a fresh client with an explicit timeout
pub fn client_with_timeout(timeout: Duration) -> Result<Client, HttpError> {
    Client::builder()
        .http1_only()
        .pool_max_idle_per_host(0)
        .timeout(timeout)
        .build()
        .map_err(HttpError::Client)
}

/// Turn a non-2xx response into [`HttpError::Upstream`], keeping only the status
pub fn error_for_status(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    warn!(status = %status, "Upstream returned error status");
    Err(HttpError::Upstream { status })
}

/// GET `url` and decode the JSON response
pub async fn http_get<T>(url: &str) -> Result<T, HttpError>
where
    T: DeserializeOwned,
{
    request(Method::GET, url, |builder| builder).await
}

/// POST `body` as JSON to `url` and decode the JSON response
pub async fn http_post<B, T>(url: &str, body: &B) -> Result<T, HttpError>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    request(Method::POST, url, |builder| builder.json(body)).await
}

/// Send a request on a fresh client and decode the JSON response.
///
/// `build` can add headers, auth or a body before the request is sent.
pub async fn request<T, F>(method: Method, url: &str, build: F) -> Result<T, HttpError>
where
    T: DeserializeOwned,
    F: FnOnce(RequestBuilder) -> RequestBuilder,
{
    request_with_client(client()?, method, url, build).await
}

async fn request_with_client<T, F>(
    client: Client,
    method: Method,
    url: &str,
    build: F,
) -> Result<T, HttpError>
where
    T: DeserializeOwned,
    F: FnOnce(RequestBuilder) -> RequestBuilder,
{
    debug!(method = %method, "Sending outbound request");

    let response = build(client.request(method, url))
        .send()
        .await
        .map_err(HttpError::Transport)?;

    let response = error_for_status(response)?;
    response.json::<T>().await.map_err(HttpError::Decode)
}
