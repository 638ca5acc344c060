//! Merged per-file analysis results
//!
//! Provides structures for tracking analysis results at package, file and
//! aggregate levels.

use super::{Ecosystem, ManifestKind, PackageStatus, RemoteVerdict};
use crate::delta::{ChangeType, UpdateSeverity};
use crate::error::RemoteErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::AddAssign;
use std::path::PathBuf;

/// The UI-facing unit: a remote verdict merged with parse-time data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageAnalysis {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
    pub status: PackageStatus,
    pub ecosystem: Ecosystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<RemoteErrorKind>,
    /// 1-based line of the declaration in the manifest
    pub source_line: usize,
    /// Present only when `status` is outdated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_type: Option<ChangeType>,
    /// Present only when `status` is outdated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_severity: Option<UpdateSeverity>,
}

impl PackageAnalysis {
    /// Builds an analysis from a verdict and the declaration's line
    pub fn from_verdict(verdict: RemoteVerdict, source_line: usize) -> Self {
        Self {
            name: verdict.name,
            current_version: verdict.current_version,
            latest_version: verdict.latest_version,
            status: verdict.status,
            ecosystem: verdict.ecosystem,
            documentation_url: verdict.documentation_url,
            registry_url: verdict.registry_url,
            error_detail: verdict.error_detail,
            error_kind: verdict.error_kind,
            source_line,
            change_type: None,
            update_severity: None,
        }
    }

    /// Attaches the change classification (builder pattern)
    pub fn with_change(mut self, change_type: ChangeType, severity: UpdateSeverity) -> Self {
        self.change_type = Some(change_type);
        self.update_severity = Some(severity);
        self
    }

    pub fn is_outdated(&self) -> bool {
        self.status == PackageStatus::Outdated
    }

    pub fn is_error(&self) -> bool {
        self.status == PackageStatus::Error
    }
}

/// Aggregate counters; `total == up_to_date + outdated + errors` always holds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub up_to_date: usize,
    pub outdated: usize,
    pub errors: usize,
}

impl Statistics {
    /// Counts statuses of the given packages
    pub fn from_packages(packages: &[PackageAnalysis]) -> Self {
        packages.iter().fold(Self::default(), |mut stats, pkg| {
            stats.record(pkg.status);
            stats
        })
    }

    /// Statistics of a file that failed as a whole
    pub fn single_error() -> Self {
        let mut stats = Self::default();
        stats.record(PackageStatus::Error);
        stats
    }

    /// Counts one package with the given status
    pub fn record(&mut self, status: PackageStatus) {
        self.total += 1;
        match status {
            PackageStatus::UpToDate => self.up_to_date += 1,
            PackageStatus::Outdated => self.outdated += 1,
            PackageStatus::Error => self.errors += 1,
        }
    }

    /// Returns true if the counters reconcile with the total
    pub fn is_consistent(&self) -> bool {
        self.total == self.up_to_date + self.outdated + self.errors
    }
}

impl AddAssign for Statistics {
    fn add_assign(&mut self, other: Self) {
        self.total += other.total;
        self.up_to_date += other.up_to_date;
        self.outdated += other.outdated;
        self.errors += other.errors;
    }
}

impl Sum for Statistics {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |mut acc, stats| {
            acc += stats;
            acc
        })
    }
}

impl<'a> Sum<&'a Statistics> for Statistics {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Why a whole file could not be analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The file name is not a supported manifest
    UnsupportedFileKind,
    /// The file could not be read
    ReadFailure,
    /// The manifest content is malformed
    ParseFailure,
    /// Any other failure inside the pipeline
    Internal,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::UnsupportedFileKind => write!(f, "unsupported file"),
            FailureKind::ReadFailure => write!(f, "read failure"),
            FailureKind::ParseFailure => write!(f, "parse failure"),
            FailureKind::Internal => write!(f, "internal error"),
        }
    }
}

/// The representative error of a failed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Line hint for parse failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl AnalysisFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}

/// Top-level output for one manifest file
///
/// Replaced wholesale on re-analysis, never patched in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Path of the analyzed manifest
    pub file: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ManifestKind>,
    /// One entry per declared package, in declaration order
    pub packages: Vec<PackageAnalysis>,
    pub statistics: Statistics,
    pub timestamp: DateTime<Utc>,
    /// Set when the file failed as a whole
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<AnalysisFailure>,
}

impl AnalysisResult {
    /// Creates a result from merged packages
    pub fn from_packages(
        file: impl Into<PathBuf>,
        kind: ManifestKind,
        packages: Vec<PackageAnalysis>,
    ) -> Self {
        let statistics = Statistics::from_packages(&packages);
        Self {
            file: file.into(),
            kind: Some(kind),
            packages,
            statistics,
            timestamp: Utc::now(),
            failure: None,
        }
    }

    /// Creates a valid result for a manifest that declares nothing
    pub fn empty(file: impl Into<PathBuf>, kind: ManifestKind) -> Self {
        Self::from_packages(file, kind, Vec::new())
    }

    /// Creates a single-error result with no packages
    pub fn failed(
        file: impl Into<PathBuf>,
        kind: Option<ManifestKind>,
        failure: AnalysisFailure,
    ) -> Self {
        Self {
            file: file.into(),
            kind,
            packages: Vec::new(),
            statistics: Statistics::single_error(),
            timestamp: Utc::now(),
            failure: Some(failure),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Returns true if the file or any package is in error
    pub fn has_errors(&self) -> bool {
        self.statistics.errors > 0
    }

    /// Returns all outdated packages
    pub fn outdated(&self) -> impl Iterator<Item = &PackageAnalysis> {
        self.packages.iter().filter(|p| p.is_outdated())
    }

    /// Finds the package declared on a given line
    pub fn package_at_line(&self, line: usize) -> Option<&PackageAnalysis> {
        self.packages.iter().find(|p| p.source_line == line)
    }
}
