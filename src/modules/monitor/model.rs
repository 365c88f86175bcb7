use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::time::Duration;

use crate::services::checker::CheckResult;
use crate::services::storage::StorageError;

/// One row of `check_results`
#[derive(Debug, Clone, FromRow)]
pub struct CheckResultRecord {
    pub id: i64,
    pub url: String,
    pub status_code: i32,
    pub response_time_ms: i32,
    pub is_healthy: bool,
    pub error_message: Option<String>,
    pub checked_at: DateTime<Utc>,
}

impl TryFrom<CheckResultRecord> for CheckResult {
    type Error = StorageError;

    fn try_from(record: CheckResultRecord) -> Result<Self, Self::Error> {
        let status_code = u16::try_from(record.status_code).map_err(|_| {
            StorageError::InvalidRecord(format!("row {} has status code {}", record.id, record.status_code))
        })?;
        let response_time = Duration::from_millis(record.response_time_ms.max(0) as u64);

        Ok(CheckResult {
            url: record.url,
            status_code,
            response_time,
            is_healthy: record.is_healthy,
            error: record.error_message,
            checked_at: record.checked_at,
        })
    }
}
