// ABOUTME: GET /health with independent per-binding probes
// ABOUTME: Each probe classifies its own failure; the report degrades instead of erroring

use std::collections::BTreeMap;
use std::time::Instant;

use axum::Json;
use chrono::Utc;
use edgeapi_settings::WorkerSettings;
use tracing::{info, warn};

use crate::deps::Settings;
use crate::models::{HealthResponse, OverallStatus, ServiceCheck};

/// Key read by the KV probe
pub const KV_PROBE_KEY: &str = "config:version";

/// Query run by the database probe
pub const DB_PROBE_QUERY: &str = "SELECT 1 AS ok";

/// Probe the KV namespace with a single read
pub async fn check_kv(settings: &WorkerSettings) -> ServiceCheck {
    let Some(kv) = settings.kv.as_ref() else {
        return ServiceCheck::not_configured("KV binding missing");
    };

    let start = Instant::now();
    match kv.get(KV_PROBE_KEY).await {
        Ok(value) => {
            let message = if value.is_some_and(|v| !v.is_empty()) {
                "readable (key found)"
            } else {
                "readable (key not found)"
            };
            ServiceCheck::ok(message).with_latency(start.elapsed())
        }
        Err(err) => {
            warn!(probe = "kv", kind = err.kind(), error = %err, "Health probe failed");
            ServiceCheck::error(format!("read failed: {}", err.kind())).with_latency(start.elapsed())
        }
    }
}

/// Probe the database with a trivial query
pub async fn check_d1(settings: &WorkerSettings) -> ServiceCheck {
    let Some(db) = settings.db.as_ref() else {
        return ServiceCheck::not_configured("D1 binding missing");
    };

    let start = Instant::now();
    match db.all(DB_PROBE_QUERY).await {
        Ok(_) => ServiceCheck::ok("query executed").with_latency(start.elapsed()),
        Err(err) => {
            warn!(probe = "d1", kind = err.kind(), error = %err, "Health probe failed");
            ServiceCheck::error(format!("query failed: {}", err.kind()))
                .with_latency(start.elapsed())
        }
    }
}

/// Verify the AI binding exists. Does not run a model.
pub fn check_ai(settings: &WorkerSettings) -> ServiceCheck {
    if settings.ai.is_none() {
        return ServiceCheck::not_configured("AI binding missing");
    }
    ServiceCheck::ok("binding available")
}

/// Count non-sensitive env vars. Values are never reported.
pub fn check_env_vars(settings: &WorkerSettings) -> ServiceCheck {
    let vars = settings.env_vars();
    let missing = vars.iter().filter(|(_, value)| value.is_none()).count();

    if missing > 0 {
        return ServiceCheck::error(format!("{} env var(s) missing", missing));
    }
    ServiceCheck::ok(format!("{} env var(s) configured", vars.len()))
}

/// Count required secrets. Names and values are never reported.
pub fn check_secrets(settings: &WorkerSettings) -> ServiceCheck {
    let required = settings.required_secrets();
    let configured = required.iter().filter(|(_, value)| value.is_some()).count();
    let total = required.len();

    if configured < total {
        return ServiceCheck::degraded(format!(
            "{} of {} required secret(s) configured",
            configured, total
        ));
    }
    ServiceCheck::ok(format!("{} required secret(s) configured", configured))
}

/// Count optional secrets; always ok
pub fn check_optional_secrets(settings: &WorkerSettings) -> ServiceCheck {
    let optional = settings.optional_secrets();
    let configured = optional.iter().filter(|(_, value)| value.is_some()).count();

    ServiceCheck::ok(format!(
        "{} of {} optional secret(s) configured",
        configured,
        optional.len()
    ))
}

/// Run every probe and fold the results into one report.
///
/// The I/O probes run concurrently; none of them can fail the report.
pub async fn run_checks(settings: &WorkerSettings) -> HealthResponse {
    let (kv, d1) = tokio::join!(check_kv(settings), check_d1(settings));

    let mut checks = BTreeMap::new();
    checks.insert("kv".to_string(), kv);
    checks.insert("d1".to_string(), d1);
    checks.insert("ai".to_string(), check_ai(settings));
    checks.insert("env_vars".to_string(), check_env_vars(settings));
    checks.insert("secrets".to_string(), check_secrets(settings));
    checks.insert("optional_secrets".to_string(), check_optional_secrets(settings));

    HealthResponse {
        status: OverallStatus::from_checks(checks.values()),
        checks,
        timestamp: Utc::now().to_rfc3339(),
    }
}

/// Probe every binding and return per-check status.
///
/// - **kv**: reads a key from the KV namespace
/// - **d1**: runs `SELECT 1` against the database
/// - **ai**: verifies the AI binding exists
/// - **env_vars**: confirms non-sensitive vars are set
/// - **secrets**: confirms required secrets are set (never reports values)
/// - **optional_secrets**: counts configured optional secrets
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health report; inspect `status` for degradation", body = HealthResponse)
    )
)]
pub async fn health(Settings(settings): Settings) -> Json<HealthResponse> {
    let report = run_checks(&settings).await;

    let failing: Vec<&str> = report
        .checks
        .iter()
        .filter(|(_, check)| !check.status.is_healthy())
        .map(|(name, _)| name.as_str())
        .collect();
    info!(status = ?report.status, failing = ?failing, "Health check completed");

    Json(report)
}
