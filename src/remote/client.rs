//! HTTP transport for the analysis API
//!
//! This module provides:
//! - A `Transport` seam so the retry loop can be driven by scripted fakes
//! - The reqwest-backed `HttpClient` with timeout, User-Agent and bearer auth
//! - Exponential backoff retry that never retries client errors (4xx)

use crate::error::RemoteError;
use crate::remote::wire::{AnalyzeRequest, AnalyzeResponse};
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for one HTTP attempt (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header
pub const DEFAULT_USER_AGENT: &str = concat!("depwatch/", env!("CARGO_PKG_VERSION"));

/// Maximum number of attempts, including the first one
pub const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff (in milliseconds)
pub const BASE_DELAY_MS: u64 = 100;

/// One POST to the analysis API, without retries
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_analyze(
        &self,
        url: &str,
        request: &AnalyzeRequest,
        token: Option<&str>,
    ) -> Result<AnalyzeResponse, RemoteError>;
}

/// HTTP client wrapper around reqwest
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, RemoteError> {
        Self::with_config(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(timeout: Duration, user_agent: &str) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| RemoteError::Unknown {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn post_analyze(
        &self,
        url: &str,
        request: &AnalyzeRequest,
        token: Option<&str>,
    ) -> Result<AnalyzeResponse, RemoteError> {
        let mut builder = self.client.post(url).json(request);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(classify_send_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::from_status(status.as_u16(), body));
        }

        response
            .json::<AnalyzeResponse>()
            .await
            .map_err(|e| RemoteError::InvalidResponse {
                message: format!("failed to parse JSON: {}", e),
            })
    }
}

/// Maps a connection-level failure onto the error taxonomy
fn classify_send_error(error: reqwest::Error) -> RemoteError {
    if error.is_timeout() {
        return RemoteError::Timeout;
    }
    if error.is_connect() || error.is_request() {
        return RemoteError::Network {
            message: connection_reason(&error),
        };
    }
    RemoteError::Unknown {
        message: error.to_string(),
    }
}

/// Names the lowest-level cause (DNS lookup, refused connection, ...)
fn connection_reason(error: &reqwest::Error) -> String {
    let mut reason = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        reason = cause.to_string();
        source = cause.source();
    }
    reason
}

/// How many times to try and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after the given failed attempt (1-based): base, 2*base, 4*base, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Sends `request`, retrying retryable failures with exponential backoff
///
/// Returns the last error once attempts are exhausted, or the first
/// non-retryable error immediately.
pub async fn post_with_retry(
    transport: &dyn Transport,
    policy: RetryPolicy,
    url: &str,
    request: &AnalyzeRequest,
    token: Option<&str>,
) -> Result<AnalyzeResponse, RemoteError> {
    let mut attempt = 1;
    loop {
        debug!(attempt, url, "posting analysis request");
        match transport.post_analyze(url, request, token).await {
            Ok(response) => return Ok(response),
            Err(e) if !e.is_retryable() => {
                debug!(attempt, error = %e, "not retrying client error");
                return Err(e);
            }
            Err(e) if attempt >= policy.max_attempts => {
                warn!(attempts = attempt, error = %e, "analysis request failed");
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_after(attempt);
                debug!(attempt, error = %e, delay_ms = delay.as_millis() as u64, "retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
