use std::str::FromStr;

use anyhow::{ensure, Context, Result};

const DEFAULT_LISTINGS_URL: &str = "https://jobs.cvrve.me/api/intern";

/// Accepted `RETENTION_DAYS` range, in days (ten years at most).
const RETENTION_DAYS_RANGE: std::ops::RangeInclusive<i64> = 1..=3650;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// External internship feed polled by the sync endpoint.
    pub listings_url: String,
    /// Bearer secret for `POST /api/v1/sync`. Unset means the endpoint is open.
    pub cron_secret: Option<String>,
    pub match_page_size: u32,
    pub browse_page_size: u32,
    pub max_upload_bytes: usize,
    pub retention_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            listings_url: std::env::var("LISTINGS_URL")
                .unwrap_or_else(|_| DEFAULT_LISTINGS_URL.to_string()),
            cron_secret: std::env::var("CRON_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            match_page_size: parse_env("MATCH_PAGE_SIZE", 50)?,
            browse_page_size: parse_env("BROWSE_PAGE_SIZE", 50)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            retention_days: validate_retention_days(parse_env("RETENTION_DAYS", 90)?)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

fn validate_retention_days(days: i64) -> Result<i64> {
    ensure!(
        RETENTION_DAYS_RANGE.contains(&days),
        "Environment variable 'RETENTION_DAYS' must be between {} and {}, got {days}",
        RETENTION_DAYS_RANGE.start(),
        RETENTION_DAYS_RANGE.end()
    );
    Ok(days)
}

#[cfg(test)]
impl Config {
    /// Defaults for router tests; no environment access.
    pub fn for_tests() -> Self {
        Config {
            database_url: "postgres://localhost/skillmatch_test".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            listings_url: "http://127.0.0.1:9/feed".to_string(),
            cron_secret: None,
            match_page_size: 50,
            browse_page_size: 50,
            max_upload_bytes: 1024 * 1024,
            retention_days: 90,
        }
    }
}
