//! Cached client for the analysis API

use crate::cache::TtlCache;
use crate::domain::{DeclaredPackage, Ecosystem, ManifestKind, PackageStatus, RemoteVerdict};
use crate::error::RemoteError;
use crate::manifest::synthesize_manifest;
use crate::remote::client::{post_with_retry, RetryPolicy, Transport};
use crate::remote::wire::{AnalyzeRequest, AnalyzeResponse, WirePackage, ANALYZE_PATH};
use crate::remote::{PackageAnalyzer, RemoteAnalysis};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How long a successful analysis stays cached (5 minutes)
pub const DEFAULT_SUCCESS_TTL: Duration = Duration::from_secs(300);

/// How long a failed analysis stays cached (2 minutes)
pub const DEFAULT_FAILURE_TTL: Duration = Duration::from_secs(120);

/// Order-independent cache key for a dependency set
///
/// Sorted, deduplicated `ecosystem:name@version` identities joined by commas.
pub fn cache_key(packages: &[DeclaredPackage]) -> String {
    packages
        .iter()
        .map(DeclaredPackage::cache_identity)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(",")
}

/// Analysis API client with retry and a TTL cache
pub struct RemoteAnalysisClient {
    endpoint: String,
    token: Option<String>,
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    cache: Arc<TtlCache<RemoteAnalysis>>,
    success_ttl: Duration,
    failure_ttl: Duration,
}

impl RemoteAnalysisClient {
    /// Creates a client posting to `endpoint` (scheme and host, no path)
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn Transport>,
        cache: Arc<TtlCache<RemoteAnalysis>>,
    ) -> Self {
        let endpoint: String = endpoint.into();
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            token: None,
            transport,
            retry: RetryPolicy::default(),
            cache,
            success_ttl: DEFAULT_SUCCESS_TTL,
            failure_ttl: DEFAULT_FAILURE_TTL,
        }
    }

    /// Sets the bearer credential; empty strings count as absent (builder pattern)
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Sets the retry policy (builder pattern)
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Sets success and failure TTLs (builder pattern)
    pub fn with_ttls(mut self, success: Duration, failure: Duration) -> Self {
        self.success_ttl = success;
        self.failure_ttl = failure;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn cache(&self) -> &Arc<TtlCache<RemoteAnalysis>> {
        &self.cache
    }

    fn analyze_url(&self) -> String {
        format!("{}{}", self.endpoint, ANALYZE_PATH)
    }

    async fn fetch(
        &self,
        kind: ManifestKind,
        packages: &[DeclaredPackage],
    ) -> Result<AnalyzeResponse, RemoteError> {
        let request = AnalyzeRequest {
            content: synthesize_manifest(kind, packages),
            file_name: kind.canonical_file_name().to_string(),
        };
        post_with_retry(
            self.transport.as_ref(),
            self.retry,
            &self.analyze_url(),
            &request,
            self.token.as_deref(),
        )
        .await
    }
}

#[async_trait]
impl PackageAnalyzer for RemoteAnalysisClient {
    async fn analyze(&self, packages: &[DeclaredPackage]) -> RemoteAnalysis {
        let Some(first) = packages.first() else {
            return RemoteAnalysis::default();
        };

        let key = cache_key(packages);
        if let Some(cached) = self.cache.get(&key) {
            debug!(packages = packages.len(), "analysis cache hit");
            return cached;
        }

        let ecosystem = first.ecosystem;
        match self.fetch(ManifestKind::from(ecosystem), packages).await {
            Ok(response) => {
                let results = response
                    .packages
                    .into_iter()
                    .map(|wire| verdict_from_wire(wire, ecosystem))
                    .collect();
                let analysis = RemoteAnalysis::succeeded(results);
                self.cache.set(key, analysis.clone(), self.success_ttl);
                analysis
            }
            Err(e) => {
                warn!(error = %e, kind = %e.kind(), "analysis request failed; reporting errors");
                let analysis = failure_analysis(packages, &e);
                self.cache.set(key, analysis.clone(), self.failure_ttl);
                analysis
            }
        }
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }
}

/// Converts one wire entry, falling back to the request's ecosystem
fn verdict_from_wire(wire: WirePackage, requested: Ecosystem) -> RemoteVerdict {
    let ecosystem = Ecosystem::from_package_manager(&wire.package_manager).unwrap_or(requested);
    let registry_url = ecosystem.registry_url(&wire.name);
    let mut verdict = RemoteVerdict::new(
        wire.name,
        wire.current_version,
        wire.latest_version,
        PackageStatus::from_wire(&wire.status),
        ecosystem,
    )
    .with_documentation_url(wire.homepage.filter(|h| !h.is_empty()))
    .with_registry_url(registry_url);
    verdict.error_detail = wire.error.filter(|e| !e.is_empty());
    verdict
}

/// One error verdict per requested package
fn failure_analysis(packages: &[DeclaredPackage], error: &RemoteError) -> RemoteAnalysis {
    let message = error.to_string();
    let results = packages
        .iter()
        .map(|p| {
            RemoteVerdict::error(&p.name, &p.declared_version, p.ecosystem, &message)
                .with_error_kind(error.kind())
        })
        .collect();
    RemoteAnalysis {
        results,
        failure: Some(error.kind()),
    }
}
