// ABOUTME: Native host for edgeapi workers
// ABOUTME: Wires process config and local bindings into the worker and serves it

pub mod config;
pub mod host;
pub mod worker;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, HostConfig};
pub use host::{build_app, build_env, run_scheduled, serve};
pub use worker::{CronTask, ScheduledEvent, Worker, HEALTH_CHECK_CRON};
