//! Runtime configuration read from the environment.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::models::CategoryId;
use crate::remote::{http_base_url, QiitaClient, RemoteResult};
use crate::sync::DEFAULT_SYNC_CONCURRENCY;

pub const DEFAULT_QIITA_API_BASE_URL: &str = "https://qiita.com/api/v2";
pub const DEFAULT_APP_URL: &str = "http://localhost:8080";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const MAX_HTTP_TIMEOUT_SECS: u64 = 120;
const MAX_SYNC_CONCURRENCY: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockerConfig {
    /// `STOCKER_DB_PATH`; clients pick their own default when unset
    pub db_path: Option<PathBuf>,
    pub qiita_api_base_url: String,
    pub http_timeout: Duration,
    pub sync_concurrency: usize,
    /// Public base URL that `Link` targets are built from
    pub app_url: String,
}

impl Default for StockerConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            qiita_api_base_url: DEFAULT_QIITA_API_BASE_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            sync_concurrency: DEFAULT_SYNC_CONCURRENCY,
            app_url: DEFAULT_APP_URL.to_string(),
        }
    }
}

impl StockerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let values: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(|name| values.get(name).cloned())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = optional_trimmed(&lookup, "STOCKER_DB_PATH").map(PathBuf::from);

        let qiita_api_base_url =
            base_url_value(&lookup, "QIITA_API_BASE_URL", DEFAULT_QIITA_API_BASE_URL)?;

        let timeout_secs = value_or_default(
            &lookup,
            "QIITA_HTTP_TIMEOUT_SECS",
            &DEFAULT_HTTP_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .ok()
        .filter(|secs| (1..=MAX_HTTP_TIMEOUT_SECS).contains(secs))
        .ok_or_else(|| {
            ConfigError::Invalid(format!(
                "QIITA_HTTP_TIMEOUT_SECS must be an integer in [1, {MAX_HTTP_TIMEOUT_SECS}]"
            ))
        })?;

        let sync_concurrency = value_or_default(
            &lookup,
            "STOCKER_SYNC_CONCURRENCY",
            &DEFAULT_SYNC_CONCURRENCY.to_string(),
        )
        .parse::<usize>()
        .ok()
        .filter(|limit| (1..=MAX_SYNC_CONCURRENCY).contains(limit))
        .ok_or_else(|| {
            ConfigError::Invalid(format!(
                "STOCKER_SYNC_CONCURRENCY must be an integer in [1, {MAX_SYNC_CONCURRENCY}]"
            ))
        })?;

        let app_url = base_url_value(&lookup, "STOCKER_APP_URL", DEFAULT_APP_URL)?;

        Ok(Self {
            db_path,
            qiita_api_base_url,
            http_timeout: Duration::from_secs(timeout_secs),
            sync_concurrency,
            app_url,
        })
    }

    /// Build the Qiita client these settings describe.
    pub fn qiita_client(&self) -> RemoteResult<QiitaClient> {
        QiitaClient::new(self.qiita_api_base_url.clone(), self.http_timeout)
    }

    /// `Link` base for the all-stocks listing.
    pub fn stocks_uri(&self) -> String {
        format!("{}/api/stocks", self.app_url)
    }

    /// `Link` base for one category's listing.
    pub fn categorized_stocks_uri(&self, category_id: CategoryId) -> String {
        format!("{}/api/stocks/categories/{category_id}", self.app_url)
    }
}

fn value_or_default(lookup: impl Fn(&str) -> Option<String>, name: &str, default: &str) -> String {
    optional_trimmed(lookup, name).unwrap_or_else(|| default.to_string())
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn base_url_value(
    lookup: impl Fn(&str) -> Option<String>,
    name: &str,
    default: &str,
) -> Result<String, ConfigError> {
    http_base_url(&value_or_default(lookup, name, default)).ok_or_else(|| {
        ConfigError::Invalid(format!("{name} must be an absolute http:// or https:// URL"))
    })
}
