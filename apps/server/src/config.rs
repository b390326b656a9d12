use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use bonbast_market_data::{cache::DEFAULT_CAPACITY, provider::bonbast::DEFAULT_BASE_URL};
use thiserror::Error;

/// Output format of the tracing subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Error, Debug)]
#[error("expected `text` or `json`, got `{0}`")]
pub struct InvalidLogFormat(String);

impl FromStr for LogFormat {
    type Err = InvalidLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(InvalidLogFormat(s.to_string())),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub upstream_url: String,
    pub upstream_timeout: Duration,
    /// Whole-request deadline; `None` leaves requests bounded only by the
    /// upstream timeout of each fetch.
    pub request_timeout: Option<Duration>,
    pub cors_allow: Vec<String>,
    pub latest_ttl: Duration,
    pub archive_ttl: Duration,
    pub max_range_days: u32,
    pub cache_capacity: u64,
    pub log_format: LogFormat,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr = parse_env("RATES_LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8000)))?;
        let upstream_url = env_or("RATES_UPSTREAM_URL", DEFAULT_BASE_URL);
        let upstream_timeout_ms: u64 = parse_env("RATES_UPSTREAM_TIMEOUT_MS", 30_000)?;
        let request_timeout_ms: u64 = parse_env("RATES_REQUEST_TIMEOUT_MS", 0)?;
        let cors_allow = env_or("RATES_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let latest_ttl_secs: u64 = parse_env("RATES_LATEST_TTL_SECS", 30 * 60)?;
        let archive_ttl_secs: u64 = parse_env("RATES_ARCHIVE_TTL_SECS", 24 * 60 * 60)?;
        let max_range_days = parse_env("RATES_MAX_RANGE_DAYS", 366)?;
        let cache_capacity = parse_env("RATES_CACHE_CAPACITY", DEFAULT_CAPACITY)?;
        let log_format = parse_env("RATES_LOG_FORMAT", LogFormat::Text)?;

        Ok(Self {
            listen_addr,
            upstream_url,
            upstream_timeout: Duration::from_millis(upstream_timeout_ms),
            request_timeout: (request_timeout_ms > 0)
                .then(|| Duration::from_millis(request_timeout_ms)),
            cors_allow,
            latest_ttl: Duration::from_secs(latest_ttl_secs),
            archive_ttl: Duration::from_secs(archive_ttl_secs),
            max_range_days,
            cache_capacity,
            log_format,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            upstream_url: DEFAULT_BASE_URL.to_string(),
            upstream_timeout: Duration::from_secs(30),
            request_timeout: None,
            cors_allow: vec!["*".to_string()],
            latest_ttl: Duration::from_secs(30 * 60),
            archive_ttl: Duration::from_secs(24 * 60 * 60),
            max_range_days: 366,
            cache_capacity: DEFAULT_CAPACITY,
            log_format: LogFormat::Text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cache_policy() {
        let config = Config::default();
        assert_eq!(config.latest_ttl, Duration::from_secs(1800));
        assert_eq!(config.archive_ttl, Duration::from_secs(86400));
        assert_eq!(config.cors_allow, vec!["*"]);
        assert_eq!(config.request_timeout, None);
    }

    #[test]
    fn test_log_format_accepts_text_and_json_only() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!("xml".parse::<LogFormat>().is_err());

        std::env::set_var("RATES_TEST_LOG_FORMAT", "xml");
        let result = parse_env("RATES_TEST_LOG_FORMAT", LogFormat::Text);
        assert!(result.is_err());
        std::env::remove_var("RATES_TEST_LOG_FORMAT");
    }

    #[test]
    fn test_parse_env_reports_invalid_values() {
        std::env::set_var("RATES_TEST_INVALID_NUMBER", "soon");
        let result: anyhow::Result<u64> = parse_env("RATES_TEST_INVALID_NUMBER", 1);
        assert!(result.is_err());
        std::env::remove_var("RATES_TEST_INVALID_NUMBER");

        let fallback: u64 = parse_env("RATES_TEST_UNSET_NUMBER", 7).unwrap();
        assert_eq!(fallback, 7);
    }
}
