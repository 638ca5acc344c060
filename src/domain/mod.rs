//! Core domain models for depwatch
//!
//! This module contains the fundamental types used throughout the pipeline:
//! - Ecosystem and manifest kinds
//! - Packages declared in a manifest
//! - Per-package verdicts returned by the analysis service
//! - Merged per-file analysis results and statistics

mod analysis;
mod ecosystem;
mod package;
mod verdict;

pub use analysis::{AnalysisFailure, AnalysisResult, FailureKind, PackageAnalysis, Statistics};
pub use ecosystem::{Ecosystem, ManifestKind};
pub use package::{DeclaredPackage, ANY_VERSION};
pub use verdict::{PackageStatus, RemoteVerdict};
