//! Analysis orchestrator coordinating the per-file pipeline
//!
//! This module provides:
//! - Workflow coordination: read → detect → parse → analyze → merge → store → publish
//! - Result caches per file and per workspace root
//! - Sequential workspace analysis with cross-file statistics
//!
//! `analyze_file` never fails: every problem becomes a single-error
//! `AnalysisResult` that is cached and published like any other result.
//! Concurrent calls for the same file are not serialized; the last one to
//! finish wins.

use crate::delta::{ChangeType, SeverityPolicy};
use crate::domain::{
    AnalysisFailure, AnalysisResult, DeclaredPackage, FailureKind, ManifestKind, PackageAnalysis,
    RemoteVerdict, Statistics,
};
use crate::error::ManifestError;
use crate::events::AnalysisEvents;
use crate::manifest;
use crate::remote::PackageAnalyzer;
use crate::workspace::FileSource;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Message attached to declared packages the service returned nothing for
pub const UNMATCHED_MESSAGE: &str = "no analysis result available";

type ResultMap = HashMap<PathBuf, Arc<AnalysisResult>>;

/// Results of analyzing many files
#[derive(Debug, Clone, Default)]
pub struct WorkspaceReport {
    /// One result per file, in analysis order
    pub results: Vec<Arc<AnalysisResult>>,
    /// Sum of every file's statistics
    pub statistics: Statistics,
    /// Number of files with at least one error
    pub files_with_errors: usize,
}

impl WorkspaceReport {
    pub fn from_results(results: Vec<Arc<AnalysisResult>>) -> Self {
        let statistics = results.iter().map(|r| r.statistics).sum();
        let files_with_errors = results.iter().filter(|r| r.has_errors()).count();
        Self {
            results,
            statistics,
            files_with_errors,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.files_with_errors > 0
    }
}

/// Coordinator owning the per-file and per-root result caches
pub struct AnalysisOrchestrator {
    files: Arc<dyn FileSource>,
    analyzer: Arc<dyn PackageAnalyzer>,
    policy: SeverityPolicy,
    results: Mutex<ResultMap>,
    partitions: Mutex<HashMap<PathBuf, ResultMap>>,
    roots: Mutex<Vec<PathBuf>>,
    events: AnalysisEvents,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator with no workspace roots
    pub fn new(files: Arc<dyn FileSource>, analyzer: Arc<dyn PackageAnalyzer>) -> Self {
        Self {
            files,
            analyzer,
            policy: SeverityPolicy::default(),
            results: Mutex::new(HashMap::new()),
            partitions: Mutex::new(HashMap::new()),
            roots: Mutex::new(Vec::new()),
            events: AnalysisEvents::new(),
        }
    }

    /// Set the update severity policy (builder pattern)
    pub fn with_policy(mut self, policy: SeverityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Change notifications, fired once per `analyze_file` call
    pub fn events(&self) -> &AnalysisEvents {
        &self.events
    }

    /// Analyze one manifest, cache the result and publish it
    pub async fn analyze_file(&self, path: &Path) -> Arc<AnalysisResult> {
        debug!(file = %path.display(), "analyzing");
        let result = match self.build_result(path).await {
            Ok(result) => result,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "analysis failed");
                AnalysisResult::failed(path, ManifestKind::from_path(path), failure_of(&e))
            }
        };

        let result = Arc::new(result);
        self.store(path, Arc::clone(&result));
        self.events.publish(&result);
        result
    }

    /// Analyze every manifest under every workspace root, one at a time
    pub async fn analyze_workspace(&self) -> WorkspaceReport {
        let roots = self.workspace_folders();
        let mut results = Vec::new();

        for root in roots {
            let files = match self.files.discover(&root).await {
                Ok(files) => files,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "skipping workspace root");
                    continue;
                }
            };
            info!(root = %root.display(), files = files.len(), "analyzing workspace root");
            for file in files {
                results.push(self.analyze_file(&file).await);
            }
        }

        WorkspaceReport::from_results(results)
    }

    /// Analyze the given files in order
    pub async fn analyze_files(&self, paths: &[PathBuf]) -> WorkspaceReport {
        let mut results = Vec::with_capacity(paths.len());
        for path in paths {
            results.push(self.analyze_file(path).await);
        }
        WorkspaceReport::from_results(results)
    }

    async fn build_result(&self, path: &Path) -> Result<AnalysisResult, ManifestError> {
        let content = self.files.read_text(path).await?;
        let kind = ManifestKind::from_path(path).ok_or_else(|| ManifestError::unsupported(path))?;

        let outcome = manifest::parse(&content, kind);
        if let Some(first) = outcome.errors.first() {
            debug!(
                file = %path.display(),
                errors = outcome.errors.len(),
                "discarding partially parsed manifest"
            );
            return Err(ManifestError::parse_failure(path, first.line, &first.message));
        }
        if outcome.packages.is_empty() {
            return Ok(AnalysisResult::empty(path, kind));
        }

        let remote = self.analyzer.analyze(&outcome.packages).await;
        let packages = self.merge(&outcome.packages, &remote.results);
        Ok(AnalysisResult::from_packages(path, kind, packages))
    }

    /// Pairs each declared package with its same-named verdict
    fn merge(&self, declared: &[DeclaredPackage], verdicts: &[RemoteVerdict]) -> Vec<PackageAnalysis> {
        let mut by_name: HashMap<&str, &RemoteVerdict> = HashMap::new();
        for verdict in verdicts {
            by_name.entry(verdict.name.as_str()).or_insert(verdict);
        }

        declared
            .iter()
            .map(|pkg| match by_name.get(pkg.name.as_str()) {
                Some(verdict) => self.analysis_for(pkg, (*verdict).clone()),
                None => {
                    debug!(package = %pkg.name, "no verdict for declared package");
                    let verdict = RemoteVerdict::error(
                        &pkg.name,
                        &pkg.declared_version,
                        pkg.ecosystem,
                        UNMATCHED_MESSAGE,
                    )
                    .with_registry_url(pkg.ecosystem.registry_url(&pkg.name));
                    PackageAnalysis::from_verdict(verdict, pkg.source_line)
                }
            })
            .collect()
    }

    fn analysis_for(&self, pkg: &DeclaredPackage, verdict: RemoteVerdict) -> PackageAnalysis {
        if !verdict.is_outdated() {
            return PackageAnalysis::from_verdict(verdict, pkg.source_line);
        }

        let current = if verdict.current_version.is_empty() {
            pkg.declared_version.clone()
        } else {
            verdict.current_version.clone()
        };
        let (change, severity) = self.policy.assess(&current, &verdict.latest_version);
        if change == ChangeType::Error {
            debug!(
                package = %pkg.name,
                current = %current,
                latest = %verdict.latest_version,
                "versions could not be compared"
            );
        }
        PackageAnalysis::from_verdict(verdict, pkg.source_line).with_change(change, severity)
    }

    fn store(&self, path: &Path, result: Arc<AnalysisResult>) {
        let root = self.owning_root(path);
        lock(&self.results).insert(path.to_path_buf(), Arc::clone(&result));

        let mut partitions = lock(&self.partitions);
        for files in partitions.values_mut() {
            files.remove(path);
        }
        partitions
            .entry(root)
            .or_default()
            .insert(path.to_path_buf(), result);
    }

    /// The deepest workspace root containing `path`, else its directory
    fn owning_root(&self, path: &Path) -> PathBuf {
        lock(&self.roots)
            .iter()
            .filter(|root| path.starts_with(root))
            .max_by_key(|root| root.components().count())
            .cloned()
            .unwrap_or_else(|| path.parent().map(Path::to_path_buf).unwrap_or_default())
    }

    /// Latest result for a file, if it has been analyzed
    pub fn cached_result(&self, path: &Path) -> Option<Arc<AnalysisResult>> {
        lock(&self.results).get(path).cloned()
    }

    /// Every cached result, sorted by file
    pub fn cached_results(&self) -> Vec<Arc<AnalysisResult>> {
        let mut results: Vec<_> = lock(&self.results).values().cloned().collect();
        results.sort_by(|a, b| a.file.cmp(&b.file));
        results
    }

    /// Cached results grouped under one workspace root, sorted by file
    pub fn workspace_results(&self, root: &Path) -> Vec<Arc<AnalysisResult>> {
        let mut results: Vec<_> = lock(&self.partitions)
            .get(root)
            .map(|files| files.values().cloned().collect())
            .unwrap_or_default();
        results.sort_by(|a, b| a.file.cmp(&b.file));
        results
    }

    /// Aggregate statistics of one workspace root without rescanning
    pub fn workspace_summary(&self, root: &Path) -> Statistics {
        lock(&self.partitions)
            .get(root)
            .map(|files| files.values().map(|r| r.statistics).sum::<Statistics>())
            .unwrap_or_default()
    }

    /// Registers a workspace root; returns false if already present
    pub fn add_workspace_folder(&self, root: impl Into<PathBuf>) -> bool {
        let root = root.into();
        let mut roots = lock(&self.roots);
        if roots.contains(&root) {
            return false;
        }
        roots.push(root);
        true
    }

    /// Detaches a root and drops every cached result under it
    pub fn remove_workspace_folder(&self, root: &Path) {
        lock(&self.roots).retain(|r| r != root);

        let removed: Vec<PathBuf> = {
            let mut results = lock(&self.results);
            let removed: Vec<PathBuf> = results
                .keys()
                .filter(|file| file.starts_with(root))
                .cloned()
                .collect();
            for file in &removed {
                results.remove(file);
            }
            removed
        };

        let mut partitions = lock(&self.partitions);
        partitions.remove(root);
        for files in partitions.values_mut() {
            for file in &removed {
                files.remove(file);
            }
        }
        partitions.retain(|_, files| !files.is_empty());
        debug!(root = %root.display(), dropped = removed.len(), "workspace root removed");
    }

    /// Current workspace roots in registration order
    pub fn workspace_folders(&self) -> Vec<PathBuf> {
        lock(&self.roots).clone()
    }

    /// Drops one file from both caches
    pub fn clear_cache_for_file(&self, path: &Path) {
        lock(&self.results).remove(path);
        let mut partitions = lock(&self.partitions);
        for files in partitions.values_mut() {
            files.remove(path);
        }
        partitions.retain(|_, files| !files.is_empty());
    }

    /// Drops every cached result and every cached remote verdict
    pub fn clear_cache(&self) {
        lock(&self.results).clear();
        lock(&self.partitions).clear();
        self.analyzer.clear_cache();
    }
}

fn failure_of(error: &ManifestError) -> AnalysisFailure {
    let kind = match error {
        ManifestError::UnsupportedFileKind { .. } => FailureKind::UnsupportedFileKind,
        ManifestError::ReadError { .. } => FailureKind::ReadFailure,
        ManifestError::ParseFailure { .. } => FailureKind::ParseFailure,
    };
    let message = match error {
        ManifestError::ParseFailure { message, .. } => message.clone(),
        other => other.to_string(),
    };
    let failure = AnalysisFailure::new(kind, message);
    match error.line() {
        Some(line) => failure.with_line(line),
        None => failure,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
