// ABOUTME: Inference binding for running hosted ML models
// ABOUTME: Workers AI implementation over the REST API using the outbound HTTP helper

use std::fmt;

use async_trait::async_trait;
use edgeapi_http::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::BindingError;

pub const DEFAULT_API_BASE: &str = "https://api.cloudflare.com/client/v4";

#[async_trait]
pub trait AiBinding: Send + Sync {
    /// Run `model` with a JSON input and return the model's JSON result
    async fn run(&self, model: &str, input: Value) -> Result<Value, BindingError>;
}

/// Workers AI reached through the account-scoped REST endpoint
pub struct WorkersAi {
    account_id: String,
    api_token: String,
    api_base: String,
}

impl WorkersAi {
    pub fn new(account_id: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            api_token: api_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn run_url(&self, model: &str) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.api_base, self.account_id, model
        )
    }
}

impl fmt::Debug for WorkersAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkersAi")
            .field("account_id", &self.account_id)
            .field("api_token", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct RunEnvelope {
    success: bool,
    #[serde(default)]
    result: Option<Value>,
}

#[async_trait]
impl AiBinding for WorkersAi {
    async fn run(&self, model: &str, input: Value) -> Result<Value, BindingError> {
        debug!(model = %model, "Running Workers AI model");

        let envelope: RunEnvelope = edgeapi_http::request(Method::POST, &self.run_url(model), |b| {
            b.bearer_auth(&self.api_token).json(&input)
        })
        .await?;

        if !envelope.success {
            return Err(BindingError::Query(format!("model {} reported failure", model)));
        }

        envelope
            .result
            .ok_or_else(|| BindingError::Decode("missing result".to_string()))
    }
}
