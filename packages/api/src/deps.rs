// ABOUTME: Request extractors exposing worker settings, bindings and the API key check
// ABOUTME: Settings are built once per request and cached in the request extensions

use std::sync::Arc;

use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use edgeapi_bindings::{Database, Env, KvNamespace};
use edgeapi_settings::WorkerSettings;
use tracing::{debug, warn};

use crate::error::AppError;

/// Header carrying the caller's API key (lookup is case-insensitive)
pub const API_KEY_HEADER: &str = "x-api-key";

/// Environment attached to every request by the host
#[derive(Clone)]
pub struct WorkerEnv(pub Arc<dyn Env>);

/// Typed settings for the current request.
///
/// The first extraction in a request reads the environment; later
/// extractions in the same request reuse the cached record.
#[derive(Debug, Clone)]
pub struct Settings(pub Arc<WorkerSettings>);

impl<S> FromRequestParts<S> for Settings
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        settings_for(parts).map(Settings)
    }
}

/// Return the request's settings, extracting and caching them on first use
pub fn settings_for(parts: &mut Parts) -> Result<Arc<WorkerSettings>, AppError> {
    if let Some(cached) = parts.extensions.get::<Arc<WorkerSettings>>() {
        return Ok(cached.clone());
    }

    let env = parts
        .extensions
        .get::<WorkerEnv>()
        .ok_or_else(|| AppError::internal(anyhow!("No worker environment attached to request")))?;

    let settings = Arc::new(WorkerSettings::from_env(env.0.as_ref()));
    debug!(environment = %settings.environment, "Worker settings extracted");

    parts.extensions.insert(settings.clone());
    Ok(settings)
}

/// Check a caller-supplied key against the configured `API_KEY`.
///
/// No configured key is a 503; a missing, empty or wrong key is a 401.
pub fn verify_api_key(settings: &WorkerSettings, provided: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = settings.api_key.as_ref() else {
        warn!("API key check requested but API_KEY is not configured");
        return Err(AppError::ServiceUnavailable("API key not configured"));
    };

    match provided {
        Some(key) if !key.is_empty() && expected.matches(key) => Ok(()),
        _ => {
            warn!(header_present = provided.is_some(), "Rejected invalid or missing API key");
            Err(AppError::Unauthorized("Invalid or missing API key"))
        }
    }
}

/// Guard for protected routes: succeeds only if `X-API-Key` matches `API_KEY`
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl<S> FromRequestParts<S> for ApiKey
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let settings = settings_for(parts)?;
        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok());

        verify_api_key(&settings, provided)?;
        Ok(ApiKey)
    }
}

/// KV namespace binding, or 503 when the worker has none
#[derive(Clone)]
pub struct Kv(pub Arc<dyn KvNamespace>);

impl<S> FromRequestParts<S> for Kv
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        settings_for(parts)?
            .kv
            .clone()
            .map(Kv)
            .ok_or(AppError::ServiceUnavailable("KV namespace not configured"))
    }
}

/// SQL database binding, or 503 when the worker has none
#[derive(Clone)]
pub struct Db(pub Arc<dyn Database>);

impl<S> FromRequestParts<S> for Db
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        settings_for(parts)?
            .db
            .clone()
            .map(Db)
            .ok_or(AppError::ServiceUnavailable("D1 database not configured"))
    }
}
