use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Outcome of a single HTTP probe
///
/// Build through [`CheckResult::from_status`] or [`CheckResult::failed`] so
/// that `is_healthy` always agrees with `status_code` and `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub url: String,
    /// 0 when the request never completed
    pub status_code: u16,
    #[serde(rename = "response_time_ms", with = "duration_millis")]
    pub response_time: Duration,
    pub is_healthy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    /// A probe that received a response
    pub fn from_status(
        url: impl Into<String>,
        status_code: u16,
        response_time: Duration,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            status_code,
            response_time,
            is_healthy: is_success_status(status_code),
            error: None,
            checked_at,
        }
    }

    /// A probe that failed before any response arrived
    pub fn failed(
        url: impl Into<String>,
        error: impl Into<String>,
        response_time: Duration,
        checked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            url: url.into(),
            status_code: 0,
            response_time,
            is_healthy: false,
            error: Some(error.into()),
            checked_at,
        }
    }

    pub fn response_time_ms(&self) -> u64 {
        self.response_time.as_millis() as u64
    }
}

/// 2xx is healthy, everything else is not
pub fn is_success_status(status_code: u16) -> bool {
    (200..300).contains(&status_code)
}

/// Average response time of a non-empty batch
///
/// Returns `None` for an empty batch instead of dividing by zero.
pub fn average_response_time(results: &[CheckResult]) -> Option<Duration> {
    if results.is_empty() {
        return None;
    }

    let total: Duration = results.iter().map(|r| r.response_time).sum();
    Some(total / results.len() as u32)
}

pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
