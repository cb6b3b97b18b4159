use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use sensor_monitoring::api::DEFAULT_BASE_URL;
use sensor_monitoring::MonitoringConfig;

/// Errors raised while reading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} has invalid value '{value}': {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected 'pretty' or 'json', got '{other}'")),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub log_format: LogFormat,
    /// PostgreSQL URL. When unset the in-memory repository is used.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Remote monitoring service connection settings.
    pub monitoring: MonitoringConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                  |
    /// |----------------------------|--------------------------|
    /// | `HOST`                     | `0.0.0.0`                |
    /// | `PORT`                     | `8080`                   |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                     |
    /// | `LOG_FORMAT`               | `pretty`                 |
    /// | `DATABASE_URL`             | unset (in-memory)        |
    /// | `DATABASE_MAX_CONNECTIONS` | `10`                     |
    /// | `MONITORING_BASE_URL`      | `http://localhost:8082`  |
    /// | `MONITORING_TIMEOUT_MS`    | `5000`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = parse_var(&lookup, "PORT", 8080)?;

        let raw_origins = lookup("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into());
        let cors_origins: Vec<String> = raw_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::InvalidValue {
                key: "CORS_ORIGINS",
                value: origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let request_timeout_secs: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let log_format: LogFormat = parse_var(&lookup, "LOG_FORMAT", LogFormat::Pretty)?;

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let database_max_connections: u32 = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let monitoring_base_url =
            lookup("MONITORING_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let monitoring_timeout_ms: u64 = parse_var(&lookup, "MONITORING_TIMEOUT_MS", 5000)?;

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            log_format,
            database_url,
            database_max_connections,
            monitoring: MonitoringConfig {
                base_url: monitoring_base_url,
                timeout: Duration::from_millis(monitoring_timeout_ms),
            },
        })
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                reason: e.to_string(),
                value,
            }),
    }
}
