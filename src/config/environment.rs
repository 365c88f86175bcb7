use std::env;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MONITOR_URLS: [&str; 4] = [
    "https://api.github.com/users/octocat",
    "https://jsonplaceholder.typicode.com/posts/1",
    "https://httpbin.org/status/200",
    "https://httpbin.org/delay/2",
];

/// Completion-service settings
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

/// Environment configuration
/// Loads and validates environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// In-memory storage when unset
    pub database_url: Option<String>,
    pub web_host: String,
    pub web_port: u16,
    pub check_interval: Duration,
    pub request_timeout: Duration,
    pub max_concurrency: usize,
    pub polling_enabled: bool,
    pub persist_status_checks: bool,
    pub monitor_urls: Vec<String>,
    pub result_stream_capacity: usize,
    pub insight_cache_ttl: Duration,
    pub ai: AiConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let monitor_urls = match get("MONITOR_URLS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_MONITOR_URLS.iter().map(|u| u.to_string()).collect(),
        };

        Ok(Self {
            database_url: get("DATABASE_URL"),
            web_host: get("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parse_var(&get, "WEB_PORT", 8080)?,
            check_interval: duration_var(&get, "CHECK_INTERVAL", Duration::from_secs(15))?,
            request_timeout: duration_var(&get, "REQUEST_TIMEOUT", Duration::from_secs(5))?,
            max_concurrency: parse_var(&get, "MAX_CONCURRENCY", 10)?,
            polling_enabled: bool_var(&get, "POLLING_ENABLED", true)?,
            persist_status_checks: bool_var(&get, "PERSIST_STATUS_CHECKS", true)?,
            monitor_urls,
            result_stream_capacity: parse_var(&get, "RESULT_STREAM_CAPACITY", 100)?,
            insight_cache_ttl: duration_var(&get, "INSIGHT_CACHE_TTL", Duration::from_secs(30))?,
            ai: AiConfig {
                enabled: bool_var(&get, "AI_ENABLED", true)?,
                base_url: get("AI_BASE_URL").unwrap_or_else(|| "http://localhost:8000".to_string()),
                api_key: get("AI_API_KEY").unwrap_or_default(),
                model: get("AI_MODEL").unwrap_or_else(|| "gpt-oss-20b".to_string()),
                timeout: duration_var(&get, "AI_TIMEOUT", Duration::from_secs(15))?,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.web_host, self.web_port)
    }
}

fn parse_var<T, G>(get: &G, key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|_| format!("{} has an invalid value: {:?}", key, raw)),
        None => Ok(default),
    }
}

fn bool_var<G>(get: &G, key: &str, default: bool) -> Result<bool, String>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("{} must be a boolean, got {:?}", key, v)),
        },
    }
}

fn duration_var<G>(get: &G, key: &str, default: Duration) -> Result<Duration, String>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => parse_duration(&raw).ok_or_else(|| format!("{} is not a valid duration: {:?}", key, raw)),
        None => Ok(default),
    }
}

/// `500ms`, `15s`, `2m`, `1h`, or a bare number of seconds
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let split = raw.find(|c: char| !c.is_ascii_digit()).unwrap_or(raw.len());
    let (number, unit) = raw.split_at(split);
    let value: u64 = number.parse().ok()?;

    match unit.trim() {
        "" | "s" => Some(Duration::from_secs(value)),
        "ms" => Some(Duration::from_millis(value)),
        "m" => Some(Duration::from_secs(value.checked_mul(60)?)),
        "h" => Some(Duration::from_secs(value.checked_mul(3600)?)),
        _ => None,
    }
}
