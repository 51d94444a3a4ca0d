// ABOUTME: WorkerSettings: the single typed view of vars, secrets and bindings
// ABOUTME: Built from an Env provider with explicit unset handling for every field

use std::fmt;
use std::sync::Arc;

use edgeapi_bindings::{AiBinding, Database, Env, EnvValue, KvNamespace};
use tracing::debug;

use crate::secret::SecretString;

pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Environment names read by [`WorkerSettings::from_env`]
pub mod names {
    pub const ENVIRONMENT: &str = "ENVIRONMENT";

    pub const API_KEY: &str = "API_KEY";
    pub const ADMIN_API_KEY: &str = "ADMIN_API_KEY";

    pub const SANITY_API_READ_TOKEN: &str = "SANITY_API_READ_TOKEN";
    pub const SANITY_API_WRITE_TOKEN: &str = "SANITY_API_WRITE_TOKEN";
    pub const DISCORD_BOT_TOKEN: &str = "DISCORD_BOT_TOKEN";
    pub const DISCORD_APP_ID: &str = "DISCORD_APP_ID";
    pub const DISCORD_PUBLIC_KEY: &str = "DISCORD_PUBLIC_KEY";
    pub const CF_API_TOKEN: &str = "CF_API_TOKEN";
    pub const TURNSTILE_SECRET_KEY: &str = "TURNSTILE_SECRET_KEY";

    pub const KV: &str = "KV";
    pub const DB: &str = "DB";
    pub const AI: &str = "AI";
}

/// Configuration for one worker invocation.
///
/// Three groups of fields:
/// - env vars: non-sensitive values, safe to log
/// - secrets: never logged or echoed, only counted
/// - bindings: opaque service handles supplied by the host
///
/// Adding a field here and to the matching view method is enough for the
/// health check to pick it up.
#[derive(Clone)]
pub struct WorkerSettings {
    pub environment: String,

    pub api_key: Option<SecretString>,
    pub admin_api_key: Option<SecretString>,

    pub sanity_api_read_token: Option<SecretString>,
    pub sanity_api_write_token: Option<SecretString>,
    pub discord_bot_token: Option<SecretString>,
    pub discord_app_id: Option<SecretString>,
    pub discord_public_key: Option<SecretString>,
    pub cf_api_token: Option<SecretString>,
    pub turnstile_secret_key: Option<SecretString>,

    pub kv: Option<Arc<dyn KvNamespace>>,
    pub db: Option<Arc<dyn Database>>,
    pub ai: Option<Arc<dyn AiBinding>>,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.to_string(),
            api_key: None,
            admin_api_key: None,
            sanity_api_read_token: None,
            sanity_api_write_token: None,
            discord_bot_token: None,
            discord_app_id: None,
            discord_public_key: None,
            cf_api_token: None,
            turnstile_secret_key: None,
            kv: None,
            db: None,
            ai: None,
        }
    }
}

impl WorkerSettings {
    /// Extract settings from the environment.
    ///
    /// Never fails: names that are missing, unreadable, blank or of the wrong
    /// kind become `None`.
    pub fn from_env(env: &dyn Env) -> Self {
        let secret = |name: &str| read_text(env, name).map(SecretString::from);

        Self {
            environment: read_text(env, names::ENVIRONMENT)
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),

            api_key: secret(names::API_KEY),
            admin_api_key: secret(names::ADMIN_API_KEY),

            sanity_api_read_token: secret(names::SANITY_API_READ_TOKEN),
            sanity_api_write_token: secret(names::SANITY_API_WRITE_TOKEN),
            discord_bot_token: secret(names::DISCORD_BOT_TOKEN),
            discord_app_id: secret(names::DISCORD_APP_ID),
            discord_public_key: secret(names::DISCORD_PUBLIC_KEY),
            cf_api_token: secret(names::CF_API_TOKEN),
            turnstile_secret_key: secret(names::TURNSTILE_SECRET_KEY),

            kv: read_binding(env, names::KV, |value| match value {
                EnvValue::Kv(kv) => Some(kv),
                _ => None,
            }),
            db: read_binding(env, names::DB, |value| match value {
                EnvValue::Database(db) => Some(db),
                _ => None,
            }),
            ai: read_binding(env, names::AI, |value| match value {
                EnvValue::Ai(ai) => Some(ai),
                _ => None,
            }),
        }
    }

    /// Secrets the worker cannot function without
    pub fn required_secrets(&self) -> Vec<(&'static str, Option<&SecretString>)> {
        vec![
            ("api_key", self.api_key.as_ref()),
            ("admin_api_key", self.admin_api_key.as_ref()),
        ]
    }

    /// Secrets only needed by specific features
    pub fn optional_secrets(&self) -> Vec<(&'static str, Option<&SecretString>)> {
        vec![
            ("sanity_api_read_token", self.sanity_api_read_token.as_ref()),
            ("sanity_api_write_token", self.sanity_api_write_token.as_ref()),
            ("discord_bot_token", self.discord_bot_token.as_ref()),
            ("discord_app_id", self.discord_app_id.as_ref()),
            ("discord_public_key", self.discord_public_key.as_ref()),
            ("cf_api_token", self.cf_api_token.as_ref()),
            ("turnstile_secret_key", self.turnstile_secret_key.as_ref()),
        ]
    }

    /// Non-sensitive env vars
    pub fn env_vars(&self) -> Vec<(&'static str, Option<&str>)> {
        vec![("environment", Some(self.environment.as_str()))]
    }

    /// Which bindings are present
    pub fn bindings(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("kv", self.kv.is_some()),
            ("db", self.db.is_some()),
            ("ai", self.ai.is_some()),
        ]
    }
}

impl fmt::Debug for WorkerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = |s: &Option<SecretString>| if s.is_some() { "set" } else { "unset" };
        f.debug_struct("WorkerSettings")
            .field("environment", &self.environment)
            .field("api_key", &set(&self.api_key))
            .field("admin_api_key", &set(&self.admin_api_key))
            .field(
                "optional_secrets_set",
                &self.optional_secrets().iter().filter(|(_, v)| v.is_some()).count(),
            )
            .field("bindings", &self.bindings())
            .finish()
    }
}

fn read_text(env: &dyn Env, name: &str) -> Option<String> {
    let text = match env.get(name) {
        Ok(Some(EnvValue::Text(value))) => value,
        Ok(Some(EnvValue::Number(value))) => value.to_string(),
        Ok(Some(EnvValue::Bool(value))) => value.to_string(),
        Ok(Some(other)) => {
            debug!(name = %name, kind = other.kind(), "Binding found where text was expected");
            return None;
        }
        Ok(None) => return None,
        Err(err) => {
            debug!(name = %name, error = %err, "Environment value unreadable");
            return None;
        }
    };

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn read_binding<T>(
    env: &dyn Env,
    name: &str,
    select: impl FnOnce(EnvValue) -> Option<T>,
) -> Option<T> {
    match env.get(name) {
        Ok(Some(value)) => {
            let kind = value.kind();
            let binding = select(value);
            if binding.is_none() {
                debug!(name = %name, kind, "Environment value is not the expected binding");
            }
            binding
        }
        Ok(None) => None,
        Err(err) => {
            debug!(name = %name, error = %err, "Binding unreadable");
            None
        }
    }
}
