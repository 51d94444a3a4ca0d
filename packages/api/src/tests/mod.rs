//! Router-level tests driven with `tower::ServiceExt::oneshot`


use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use edgeapi_bindings::{
    AiBinding, BindingError, Database, DbRow, KvNamespace, MemoryKv, StaticEnv,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{create_router, with_env};

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_ADMIN_KEY: &str = "test-admin-key";

/// Database that answers every query with a single `{ "ok": 1 }` row
pub struct MockDb;

#[async_trait]
impl Database for MockDb {
    async fn all(&self, _sql: &str) -> Result<Vec<DbRow>, BindingError> {
        let mut row = DbRow::new();
        row.insert("ok".to_string(), json!(1));
        Ok(vec![row])
    }

    async fn run(&self, _sql: &str) -> Result<u64, BindingError> {
        Ok(0)
    }
}

/// Database that fails every query
pub struct FailingDb;

#[async_trait]
impl Database for FailingDb {
    async fn all(&self, _sql: &str) -> Result<Vec<DbRow>, BindingError> {
        Err(BindingError::Query("no such table: secret_table".to_string()))
    }

    async fn run(&self, _sql: &str) -> Result<u64, BindingError> {
        Err(BindingError::Query("no such table: secret_table".to_string()))
    }
}

/// KV namespace whose reads always fail
pub struct FailingKv;

#[async_trait]
impl KvNamespace for FailingKv {
    async fn get(&self, _key: &str) -> Result<Option<String>, BindingError> {
        Err(BindingError::Unavailable("connection reset by kv-internal-host".to_string()))
    }

    async fn put(&self, _key: &str, _value: String) -> Result<(), BindingError> {
        Err(BindingError::Unavailable("connection reset".to_string()))
    }

    async fn delete(&self, _key: &str) -> Result<(), BindingError> {
        Err(BindingError::Unavailable("connection reset".to_string()))
    }

    async fn list(&self, _prefix: Option<&str>) -> Result<Vec<String>, BindingError> {
        Err(BindingError::Unavailable("connection reset".to_string()))
    }
}

pub struct MockAi;

#[async_trait]
impl AiBinding for MockAi {
    async fn run(&self, _model: &str, _input: Value) -> Result<Value, BindingError> {
        Ok(json!({ "response": "ok" }))
    }
}

/// Environment with every binding and both required secrets
pub fn mock_env() -> StaticEnv {
    StaticEnv::new()
        .with_text("ENVIRONMENT", "test")
        .with_text("API_KEY", TEST_API_KEY)
        .with_text("ADMIN_API_KEY", TEST_ADMIN_KEY)
        .with_kv("KV", Arc::new(MemoryKv::new()))
        .with_database("DB", Arc::new(MockDb))
        .with_ai("AI", Arc::new(MockAi))
}

pub fn app(env: StaticEnv) -> Router {
    with_env(create_router(), Arc::new(env))
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}
