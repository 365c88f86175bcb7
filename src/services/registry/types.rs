use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A URL registered for periodic polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorEndpoint {
    /// `endpoint_<unix-seconds>_<sequence>`
    pub id: String,
    pub url: String,
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("{0}")]
    InvalidUrl(&'static str),
    #[error("URL already being monitored")]
    Conflict(String),
    #[error("URL not found")]
    NotFound,
}

/// Trim and check a user-supplied URL; returns the trimmed form.
pub fn validate_endpoint_url(raw: &str) -> Result<String, RegistryError> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(RegistryError::InvalidUrl("URL is required"));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(RegistryError::InvalidUrl(
            "URL must start with http:// or https://",
        ));
    }
    Ok(url.to_string())
}
