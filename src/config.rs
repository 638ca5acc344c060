//! Configuration loading and validation
//!
//! Values come from an optional TOML file and are then overridden by
//! command-line flags and environment variables. Every section has
//! defaults, so an empty file (or no file) is a valid configuration.

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_SWEEP_INTERVAL};
use crate::delta::DEFAULT_MINOR_GAP_THRESHOLD;
use crate::error::ConfigError;
use crate::manifest::DEFAULT_EXCLUDE_PATTERNS;
use crate::remote::{
    BASE_DELAY_MS, DEFAULT_FAILURE_TTL, DEFAULT_SUCCESS_TTL, DEFAULT_TIMEOUT, MAX_ATTEMPTS,
};
use reqwest::Url;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the analysis service (scheme and host)
    pub endpoint: Option<String>,
    /// Bearer credential; empty strings count as absent
    pub api_token: Option<String>,
    /// Globs excluded from workspace discovery
    pub exclude: Vec<String>,
    pub cache: CacheConfig,
    pub retry: RetryConfig,
    pub severity: SeverityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_token: None,
            exclude: DEFAULT_EXCLUDE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            cache: CacheConfig::default(),
            retry: RetryConfig::default(),
            severity: SeverityConfig::default(),
        }
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub success_ttl_secs: u64,
    pub failure_ttl_secs: u64,
    pub max_entries: usize,
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            success_ttl_secs: DEFAULT_SUCCESS_TTL.as_secs(),
            failure_ttl_secs: DEFAULT_FAILURE_TTL.as_secs(),
            max_entries: DEFAULT_MAX_ENTRIES,
            sweep_interval_secs: DEFAULT_SWEEP_INTERVAL.as_secs(),
        }
    }
}

impl CacheConfig {
    pub fn success_ttl(&self) -> Duration {
        Duration::from_secs(self.success_ttl_secs)
    }

    pub fn failure_ttl(&self) -> Duration {
        Duration::from_secs(self.failure_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        // A zero period would make the sweep spin
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

/// Retry and timeout configuration for remote calls
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay_ms: BASE_DELAY_MS,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Update severity heuristic configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeverityConfig {
    pub minor_gap_threshold: u64,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            minor_gap_threshold: DEFAULT_MINOR_GAP_THRESHOLD,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content, path)
    }

    /// Parse configuration text; `path` is only used in error messages
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Apply command-line and environment overrides
    ///
    /// `extra_exclude` patterns are added to the configured list.
    pub fn with_overrides(
        mut self,
        endpoint: Option<String>,
        token: Option<String>,
        extra_exclude: &[String],
    ) -> Self {
        if endpoint.is_some() {
            self.endpoint = endpoint;
        }
        if token.is_some() {
            self.api_token = token;
        }
        self.exclude.extend(extra_exclude.iter().cloned());
        self
    }

    /// The validated endpoint without a trailing slash
    pub fn endpoint(&self) -> Result<String, ConfigError> {
        let value = self.endpoint.as_deref().unwrap_or_default().trim();
        validate_endpoint(value)
    }

    /// The bearer credential, if a non-empty one is configured
    pub fn token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Accepts only http(s) URLs with a non-empty host
pub fn validate_endpoint(value: &str) -> Result<String, ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidEndpoint {
        value: value.to_string(),
        message: message.to_string(),
    };

    if value.is_empty() {
        return Err(invalid("no endpoint configured"));
    }
    let url = Url::parse(value).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("host is empty"));
    }
    Ok(value.trim_end_matches('/').to_string())
}
