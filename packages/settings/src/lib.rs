// ABOUTME: Typed worker settings extracted from the per-invocation environment
// ABOUTME: Single source of truth for which vars, secrets and bindings a worker expects

pub mod secret;
pub mod worker;

pub use secret::SecretString;
pub use worker::{names, WorkerSettings, DEFAULT_ENVIRONMENT};
