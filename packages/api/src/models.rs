// ABOUTME: Response models shared by every route
// ABOUTME: Health report, per-probe result, error body; all exposed in the OpenAPI document

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard error body returned for every rejection and unhandled failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"detail": "Internal server error", "status_code": 500}))]
pub struct ErrorResponse {
    pub detail: String,
    pub status_code: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Outcome of a single probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Ok,
    Error,
    /// Binding or value absent; neutral for the overall status
    NotConfigured,
    Degraded,
}

impl CheckStatus {
    /// Whether this probe leaves the overall report healthy
    pub fn is_healthy(self) -> bool {
        matches!(self, CheckStatus::Ok | CheckStatus::NotConfigured)
    }
}

/// Result of a single service health probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({"status": "ok", "latency_ms": 2.3, "message": "query executed"}))]
pub struct ServiceCheck {
    pub status: CheckStatus,
    /// Round-trip time of the probe in milliseconds
    pub latency_ms: Option<f64>,
    /// Generic description; never contains secret or stored values
    pub message: Option<String>,
}

impl ServiceCheck {
    fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            latency_ms: None,
            message: Some(message.into()),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Ok, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Error, message)
    }

    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::NotConfigured, message)
    }

    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Degraded, message)
    }

    /// Attach a latency, rounded to two decimals
    pub fn with_latency(mut self, elapsed: Duration) -> Self {
        let ms = elapsed.as_secs_f64() * 1000.0;
        self.latency_ms = Some((ms * 100.0).round() / 100.0);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
}

impl OverallStatus {
    /// `Ok` only when every check is ok or not configured.
    /// Error and degraded checks fold into the same `Degraded` result.
    pub fn from_checks<'a>(checks: impl IntoIterator<Item = &'a ServiceCheck>) -> Self {
        if checks.into_iter().all(|check| check.status.is_healthy()) {
            OverallStatus::Ok
        } else {
            OverallStatus::Degraded
        }
    }
}

/// Response from `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: OverallStatus,
    pub checks: BTreeMap<String, ServiceCheck>,
    /// ISO 8601 UTC timestamp
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(CheckStatus::NotConfigured).unwrap(), json!("not_configured"));
        assert_eq!(serde_json::to_value(CheckStatus::Ok).unwrap(), json!("ok"));
        assert_eq!(serde_json::to_value(OverallStatus::Degraded).unwrap(), json!("degraded"));
    }

    #[test]
    fn test_service_check_always_has_all_keys() {
        let value = serde_json::to_value(ServiceCheck::ok("binding available")).unwrap();
        assert_eq!(
            value,
            json!({"status": "ok", "latency_ms": null, "message": "binding available"})
        );
    }

    #[test]
    fn test_latency_is_rounded() {
        let check = ServiceCheck::ok("x").with_latency(Duration::from_micros(1234));
        assert_eq!(check.latency_ms, Some(1.23));
    }

    #[rstest]
    #[case(vec![CheckStatus::Ok, CheckStatus::Ok], OverallStatus::Ok)]
    #[case(vec![CheckStatus::Ok, CheckStatus::NotConfigured], OverallStatus::Ok)]
    #[case(vec![CheckStatus::NotConfigured], OverallStatus::Ok)]
    #[case(vec![], OverallStatus::Ok)]
    #[case(vec![CheckStatus::Ok, CheckStatus::Error], OverallStatus::Degraded)]
    #[case(vec![CheckStatus::Degraded, CheckStatus::NotConfigured], OverallStatus::Degraded)]
    #[case(vec![CheckStatus::Error, CheckStatus::Degraded], OverallStatus::Degraded)]
    fn test_overall_status(#[case] statuses: Vec<CheckStatus>, #[case] expected: OverallStatus) {
        let checks: Vec<ServiceCheck> = statuses
            .into_iter()
            .map(|status| ServiceCheck {
                status,
                latency_ms: None,
                message: None,
            })
            .collect();
        assert_eq!(OverallStatus::from_checks(&checks), expected);
    }
}
