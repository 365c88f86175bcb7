use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::services::checker::CheckResult;
use crate::services::registry::validate_endpoint_url;

fn validate_monitor_url(url: &str) -> Result<(), ValidationError> {
    validate_endpoint_url(url).map(|_| ()).map_err(|e| {
        let mut error = ValidationError::new("url");
        error.message = Some(e.to_string().into());
        error
    })
}

/// First human-readable message out of a validation failure
pub fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

// =============================================================================
// STATUS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStatus {
    pub url: String,
    pub is_healthy: bool,
    pub status_code: u16,
    /// Milliseconds
    pub response_time: u64,
    pub last_checked: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<CheckResult> for EndpointStatus {
    fn from(result: CheckResult) -> Self {
        Self {
            response_time: result.response_time_ms(),
            url: result.url,
            is_healthy: result.is_healthy,
            status_code: result.status_code,
            last_checked: result.checked_at,
            error: result.error,
        }
    }
}

// =============================================================================
// ENDPOINTS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct EndpointRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_monitor_url"))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EndpointListResponse {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}

// =============================================================================
// MONITORS
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MonitorRequest {
    #[serde(default)]
    #[validate(custom(function = "validate_monitor_url"))]
    pub url: String,
    #[validate(range(min = 1, max = 86400, message = "intervalSeconds must be between 1 and 86400"))]
    pub interval_seconds: Option<u64>,
    #[validate(range(min = 1, max = 300, message = "timeoutSeconds must be between 1 and 300"))]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct EnableRequest {
    pub enabled: bool,
}

// =============================================================================
// RESULTS
// =============================================================================

pub const DEFAULT_RESULTS_LIMIT: u32 = 10;
pub const MAX_RESULTS_LIMIT: u32 = 500;

#[derive(Debug, Deserialize, Default)]
pub struct ResultsQuery {
    pub url: Option<String>,
    pub limit: Option<u32>,
}

impl ResultsQuery {
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_RESULTS_LIMIT)
            .clamp(1, MAX_RESULTS_LIMIT)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResultStatistics {
    pub total_checks: usize,
    pub healthy_checks: usize,
    pub uptime_percent: f64,
    pub average_response_time_ms: f64,
}

impl ResultStatistics {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let total_checks = results.len();
        if total_checks == 0 {
            return Self {
                total_checks,
                healthy_checks: 0,
                uptime_percent: 0.0,
                average_response_time_ms: 0.0,
            };
        }

        let healthy_checks = results.iter().filter(|r| r.is_healthy).count();
        let total_ms: u64 = results.iter().map(|r| r.response_time_ms()).sum();

        Self {
            total_checks,
            healthy_checks,
            uptime_percent: healthy_checks as f64 * 100.0 / total_checks as f64,
            average_response_time_ms: total_ms as f64 / total_checks as f64,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub url: String,
    pub results: Vec<EndpointStatus>,
    pub statistics: ResultStatistics,
}
