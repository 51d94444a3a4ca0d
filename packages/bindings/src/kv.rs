// ABOUTME: Key-value namespace binding
// ABOUTME: Async trait plus an in-memory implementation for the native host and tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::BindingError;

#[async_trait]
pub trait KvNamespace: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, BindingError>;

    async fn put(&self, key: &str, value: String) -> Result<(), BindingError>;

    async fn delete(&self, key: &str) -> Result<(), BindingError>;

    /// Keys in ascending order, optionally restricted to a prefix
    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>, BindingError>;
}

/// Process-local KV namespace. Contents are lost when the host exits.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvNamespace for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>, BindingError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> Result<(), BindingError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), BindingError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn list(&self, prefix: Option<&str>) -> Result<Vec<String>, BindingError> {
        let entries = self.entries.read().await;
        let keys = entries
            .keys()
            .filter(|key| prefix.map_or(true, |p| key.starts_with(p)))
            .cloned()
            .collect();
        Ok(keys)
    }
}
