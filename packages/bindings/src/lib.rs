// ABOUTME: Environment provider and service bindings for edgeapi workers
// ABOUTME: The host injects an Env per invocation; bindings are opaque Arc'd trait objects

pub mod ai;
pub mod database;
pub mod env;
pub mod error;
pub mod kv;

pub use ai::{AiBinding, WorkersAi};
pub use database::{Database, DbRow, SqliteDatabase};
pub use env::{Env, EnvError, EnvValue, ProcessEnv, StaticEnv};
pub use error::BindingError;
pub use kv::{KvNamespace, MemoryKv};
