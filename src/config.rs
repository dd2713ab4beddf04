//! Runtime configuration read from the environment.

use anyhow::{Context, Result};
use std::time::Duration;

/// NYC Open Data 311 service requests resource.
pub const DEFAULT_ENDPOINT: &str = "https://data.cityofnewyork.us/resource/erm2-nwe9.csv";

/// Number of most recent records fetched from the live endpoint.
pub const DEFAULT_LIMIT: usize = 5000;

pub const DEFAULT_LOG_FILE: &str = "logs/nyc311_dashboard.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub limit: usize,
    pub app_token: Option<String>,
    pub http_timeout: Duration,
    pub log_file_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            limit: DEFAULT_LIMIT,
            app_token: None,
            http_timeout: Duration::from_secs(30),
            log_file_path: DEFAULT_LOG_FILE.to_string(),
        }
    }
}

impl Config {
    /// Builds the config from `NYC311_*` variables (after loading `.env`).
    ///
    /// Unset variables fall back to the defaults; set but malformed ones are
    /// an error.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint = match var("NYC311_ENDPOINT") {
            Some(url) => {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("NYC311_ENDPOINT must start with http:// or https://");
                }
                url
            }
            None => defaults.endpoint,
        };

        let limit = match var("NYC311_LIMIT") {
            Some(v) => {
                let limit: usize = v
                    .trim()
                    .parse()
                    .with_context(|| format!("NYC311_LIMIT must be a positive integer, got '{v}'"))?;
                if limit == 0 {
                    anyhow::bail!("NYC311_LIMIT must be greater than zero");
                }
                limit
            }
            None => defaults.limit,
        };

        let http_timeout = match var("NYC311_HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(v.trim().parse().with_context(|| {
                format!("NYC311_HTTP_TIMEOUT_SECS must be a number of seconds, got '{v}'")
            })?),
            None => defaults.http_timeout,
        };

        Ok(Self {
            endpoint,
            limit,
            app_token: var("NYC311_APP_TOKEN"),
            http_timeout,
            log_file_path: var("LOG_FILE_PATH").unwrap_or(defaults.log_file_path),
        })
    }
}
