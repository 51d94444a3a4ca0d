// ABOUTME: Environment provider abstraction injected by the host on every invocation
// ABOUTME: Static (map-backed) and process-backed providers with opaque binding values

use std::collections::HashMap;
use std::env::VarError;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::ai::AiBinding;
use crate::database::Database;
use crate::kv::KvNamespace;

/// A single value looked up from the environment.
///
/// Text-like values are settings or secrets; the remaining variants are
/// opaque service handles that must never be rendered as text.
#[derive(Clone)]
pub enum EnvValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Kv(Arc<dyn KvNamespace>),
    Database(Arc<dyn Database>),
    Ai(Arc<dyn AiBinding>),
}

impl EnvValue {
    pub fn kind(&self) -> &'static str {
        match self {
            EnvValue::Text(_) => "text",
            EnvValue::Number(_) => "number",
            EnvValue::Bool(_) => "bool",
            EnvValue::Kv(_) => "kv",
            EnvValue::Database(_) => "database",
            EnvValue::Ai(_) => "ai",
        }
    }

    pub fn is_binding(&self) -> bool {
        matches!(self, EnvValue::Kv(_) | EnvValue::Database(_) | EnvValue::Ai(_))
    }
}

// Values may be secrets, so only the kind is printed.
impl fmt::Debug for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EnvValue::{}(..)", self.kind())
    }
}

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Environment value {name} could not be read")]
    Unreadable { name: String },

    #[error("Environment provider failed: {0}")]
    Provider(String),
}

/// Key/value view of the environment handed to a worker invocation
pub trait Env: Send + Sync {
    /// Look up `name`. `Ok(None)` means the name is not set.
    fn get(&self, name: &str) -> Result<Option<EnvValue>, EnvError>;
}

/// Map-backed environment, built up front
#[derive(Clone, Debug, Default)]
pub struct StaticEnv {
    values: HashMap<String, EnvValue>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: EnvValue) {
        self.values.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<EnvValue> {
        self.values.remove(name)
    }

    pub fn with_value(mut self, name: impl Into<String>, value: EnvValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_value(name, EnvValue::Text(value.into()))
    }

    pub fn with_kv(self, name: impl Into<String>, kv: Arc<dyn KvNamespace>) -> Self {
        self.with_value(name, EnvValue::Kv(kv))
    }

    pub fn with_database(self, name: impl Into<String>, db: Arc<dyn Database>) -> Self {
        self.with_value(name, EnvValue::Database(db))
    }

    pub fn with_ai(self, name: impl Into<String>, ai: Arc<dyn AiBinding>) -> Self {
        self.with_value(name, EnvValue::Ai(ai))
    }
}

impl Env for StaticEnv {
    fn get(&self, name: &str) -> Result<Option<EnvValue>, EnvError> {
        Ok(self.values.get(name).cloned())
    }
}

/// Environment backed by the process environment plus a fixed binding table.
///
/// Text values are read from `std::env` on every lookup, so a value changed
/// between requests is picked up by the next one.
#[derive(Clone, Debug, Default)]
pub struct ProcessEnv {
    bindings: HashMap<String, EnvValue>,
}

impl ProcessEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_binding(mut self, name: impl Into<String>, value: EnvValue) -> Self {
        self.bindings.insert(name.into(), value);
        self
    }

    pub fn binding_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }
}

impl Env for ProcessEnv {
    fn get(&self, name: &str) -> Result<Option<EnvValue>, EnvError> {
        if let Some(binding) = self.bindings.get(name) {
            return Ok(Some(binding.clone()));
        }

        match std::env::var(name) {
            Ok(value) => Ok(Some(EnvValue::Text(value))),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(EnvError::Unreadable {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use serial_test::serial;

    #[test]
    fn test_static_env_lookup() {
        let env = StaticEnv::new()
            .with_text("ENVIRONMENT", "test")
            .with_kv("KV", Arc::new(MemoryKv::new()));

        assert!(matches!(env.get("ENVIRONMENT").unwrap(), Some(EnvValue::Text(v)) if v == "test"));
        assert!(matches!(env.get("KV").unwrap(), Some(EnvValue::Kv(_))));
        assert!(env.get("MISSING").unwrap().is_none());
    }

    #[test]
    fn test_debug_never_prints_text() {
        let value = EnvValue::Text("super-secret".to_string());
        let printed = format!("{:?}", value);
        assert_eq!(printed, "EnvValue::text(..)");
        assert!(!printed.contains("super-secret"));
    }

    #[test]
    fn test_binding_detection() {
        assert!(EnvValue::Kv(Arc::new(MemoryKv::new())).is_binding());
        assert!(!EnvValue::Bool(true).is_binding());
    }

    #[test]
    #[serial]
    fn test_process_env_reads_live_values() {
        let env = ProcessEnv::new();
        std::env::remove_var("EDGEAPI_TEST_VALUE");
        assert!(env.get("EDGEAPI_TEST_VALUE").unwrap().is_none());

        std::env::set_var("EDGEAPI_TEST_VALUE", "one");
        assert!(matches!(env.get("EDGEAPI_TEST_VALUE").unwrap(), Some(EnvValue::Text(v)) if v == "one"));

        std::env::remove_var("EDGEAPI_TEST_VALUE");
    }

    #[test]
    #[serial]
    fn test_process_env_prefers_bindings() {
        std::env::set_var("EDGEAPI_TEST_KV", "not-a-binding");
        let env = ProcessEnv::new()
            .with_binding("EDGEAPI_TEST_KV", EnvValue::Kv(Arc::new(MemoryKv::new())));

        assert!(matches!(env.get("EDGEAPI_TEST_KV").unwrap(), Some(EnvValue::Kv(_))));
        assert_eq!(env.binding_names().collect::<Vec<_>>(), vec!["EDGEAPI_TEST_KV"]);

        std::env::remove_var("EDGEAPI_TEST_KV");
    }
}
