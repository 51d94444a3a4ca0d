// ABOUTME: Worker entrypoint bridging host requests and cron events into the API
// ABOUTME: fetch() drives the router; scheduled() dispatches by cron pattern

use std::sync::Arc;

use axum::{body::Body, extract::Request, response::Response, Router};
use chrono::{DateTime, Utc};
use edgeapi_api::{create_router, run_checks, with_env, OverallStatus};
use edgeapi_bindings::Env;
use edgeapi_settings::WorkerSettings;
use tower::ServiceExt;
use tracing::{info, warn};

/// Cron pattern that runs the health probes
pub const HEALTH_CHECK_CRON: &str = "*/5 * * * *";

/// A cron trigger delivered by the host
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub cron: String,
    pub scheduled_time: DateTime<Utc>,
}

impl ScheduledEvent {
    pub fn now(cron: impl Into<String>) -> Self {
        Self {
            cron: cron.into(),
            scheduled_time: Utc::now(),
        }
    }
}

/// Work bound to a cron pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronTask {
    HealthCheck,
}

impl CronTask {
    pub fn for_pattern(cron: &str) -> Option<Self> {
        match cron.trim() {
            HEALTH_CHECK_CRON => Some(CronTask::HealthCheck),
            _ => None,
        }
    }
}

pub struct Worker {
    env: Arc<dyn Env>,
    router: Router,
}

impl Worker {
    pub fn new(env: Arc<dyn Env>) -> Self {
        let router = with_env(create_router(), env.clone());
        Self { env, router }
    }

    /// Router with the environment attached, ready to serve
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle one HTTP request
    pub async fn fetch(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {})
    }

    /// Handle a cron trigger. Returns the task that ran, if any.
    pub async fn scheduled(&self, event: &ScheduledEvent) -> Option<CronTask> {
        let task = CronTask::for_pattern(&event.cron);

        match task {
            Some(CronTask::HealthCheck) => self.scheduled_health_check().await,
            None => {
                info!(
                    cron = %event.cron,
                    scheduled_time = %event.scheduled_time.to_rfc3339(),
                    "cron trigger fired"
                );
            }
        }

        task
    }

    async fn scheduled_health_check(&self) {
        let settings = WorkerSettings::from_env(self.env.as_ref());
        let report = run_checks(&settings).await;

        if report.status == OverallStatus::Degraded {
            let failing: Vec<&str> = report
                .checks
                .iter()
                .filter(|(_, check)| !check.status.is_healthy())
                .map(|(name, _)| name.as_str())
                .collect();
            warn!(failing = ?failing, "Scheduled health check degraded");
        } else {
            info!(status = ?report.status, "Scheduled health check completed");
        }
    }
}
