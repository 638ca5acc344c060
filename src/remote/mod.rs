//! Remote analysis of declared packages
//!
//! This module provides:
//! - Wire types for the analysis API
//! - HTTP transport with bounded retry and backoff
//! - `RemoteAnalysisClient`, which caches verdicts per dependency set and
//!   never fails: errors become per-package error verdicts

mod analyzer;
mod client;
mod wire;

pub use analyzer::{cache_key, RemoteAnalysisClient, DEFAULT_FAILURE_TTL, DEFAULT_SUCCESS_TTL};
pub use client::{
    post_with_retry, HttpClient, RetryPolicy, Transport, BASE_DELAY_MS, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT, MAX_ATTEMPTS,
};
pub use wire::{AnalyzeRequest, AnalyzeResponse, WirePackage, ANALYZE_PATH};

use crate::domain::{DeclaredPackage, RemoteVerdict};
use crate::error::RemoteErrorKind;
use async_trait::async_trait;

/// Verdicts for one batch of packages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteAnalysis {
    pub results: Vec<RemoteVerdict>,
    /// Set when `results` were synthesized from a failed call
    pub failure: Option<RemoteErrorKind>,
}

impl RemoteAnalysis {
    pub fn succeeded(results: Vec<RemoteVerdict>) -> Self {
        Self {
            results,
            failure: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Trait for services that judge declared packages
#[async_trait]
pub trait PackageAnalyzer: Send + Sync {
    /// Returns one verdict per package where possible; never fails
    async fn analyze(&self, packages: &[DeclaredPackage]) -> RemoteAnalysis;

    /// Drops every cached verdict
    fn clear_cache(&self);
}
