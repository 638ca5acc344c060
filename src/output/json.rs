//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of analysis reports
//! - Structured file-by-file package information

use crate::domain::{AnalysisFailure, AnalysisResult, ManifestKind, PackageAnalysis, Statistics};
use crate::orchestrator::WorkspaceReport;
use crate::output::{OutputFormatter, Verbosity};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    /// Sum of all file statistics
    statistics: &'a Statistics,
    /// Number of files with at least one error
    files_with_errors: usize,
    /// Per-file results (empty in quiet mode)
    results: Vec<JsonResult<'a>>,
}

/// JSON representation of one file result
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonResult<'a> {
    file: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<ManifestKind>,
    /// Up-to-date packages are listed only in verbose mode
    packages: Vec<&'a PackageAnalysis>,
    statistics: &'a Statistics,
    timestamp: &'a DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<&'a AnalysisFailure>,
}

impl JsonFormatter {
    /// Convert a file result to its JSON representation
    fn result_to_json<'a>(&self, result: &'a AnalysisResult) -> JsonResult<'a> {
        let packages = result
            .packages
            .iter()
            .filter(|p| {
                self.verbosity == Verbosity::Verbose || p.is_outdated() || p.is_error()
            })
            .collect();

        JsonResult {
            file: &result.file,
            kind: result.kind,
            packages,
            statistics: &result.statistics,
            timestamp: &result.timestamp,
            failure: result.failure.as_ref(),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &WorkspaceReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let results = if self.verbosity == Verbosity::Quiet {
            Vec::new()
        } else {
            report
                .results
                .iter()
                .map(|r| self.result_to_json(r))
                .collect()
        };

        let output = JsonOutput {
            statistics: &report.statistics,
            files_with_errors: report.files_with_errors,
            results,
        };

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn format_summary(
        &self,
        statistics: &Statistics,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(statistics).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }

    fn format_result(
        &self,
        result: &AnalysisResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let output = self.result_to_json(result);

        let json = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;

        writeln!(writer, "{}", json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delta::{ChangeType, UpdateSeverity};
    use crate::domain::{Ecosystem, FailureKind, PackageStatus, RemoteVerdict};
    use std::sync::Arc;

    fn create_test_report() -> WorkspaceReport {
        let outdated = PackageAnalysis::from_verdict(
            RemoteVerdict::new("react", "17.0.2", "18.2.0", PackageStatus::Outdated, Ecosystem::Npm),
            3,
        )
        .with_change(ChangeType::Major, UpdateSeverity::Critical);
        let current = PackageAnalysis::from_verdict(
            RemoteVerdict::new("lodash", "4.17.21", "4.17.21", PackageStatus::UpToDate, Ecosystem::Npm),
            4,
        );
        let ok = AnalysisResult::from_packages(
            "/w/package.json",
            ManifestKind::PackageJson,
            vec![outdated, current],
        );
        let failed = AnalysisResult::failed(
            "/w/notes/requirements.txt",
            Some(ManifestKind::Requirements),
            AnalysisFailure::new(FailureKind::ReadFailure, "permission denied"),
        );
        WorkspaceReport::from_results(vec![Arc::new(ok), Arc::new(failed)])
    }

    fn render(verbosity: Verbosity) -> serde_json::Value {
        let formatter = JsonFormatter::new(verbosity);
        let mut output = Vec::new();
        formatter.format(&create_test_report(), &mut output).unwrap();
        serde_json::from_slice(&output).unwrap()
    }

    #[test]
    fn test_format_json() {
        let parsed = render(Verbosity::Normal);

        assert_eq!(parsed["statistics"]["total"], 3);
        assert_eq!(parsed["statistics"]["upToDate"], 1);
        assert_eq!(parsed["statistics"]["outdated"], 1);
        assert_eq!(parsed["statistics"]["errors"], 1);
        assert_eq!(parsed["filesWithErrors"], 1);

        let first = &parsed["results"][0];
        assert_eq!(first["file"], "/w/package.json");
        assert_eq!(first["kind"], "package_json");
        assert_eq!(first["packages"].as_array().unwrap().len(), 1);
        assert_eq!(first["packages"][0]["name"], "react");
        assert_eq!(first["packages"][0]["changeType"], "major");
        assert_eq!(first["packages"][0]["updateSeverity"], "critical");

        let second = &parsed["results"][1];
        assert_eq!(second["failure"]["kind"], "read_failure");
        assert_eq!(second["failure"]["message"], "permission denied");
    }

    #[test]
    fn test_format_json_verbose_keeps_all_packages() {
        let parsed = render(Verbosity::Verbose);
        let packages = parsed["results"][0]["packages"].as_array().unwrap();
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[1]["status"], "up-to-date");
    }

    #[test]
    fn test_format_json_quiet() {
        let parsed = render(Verbosity::Quiet);
        assert!(parsed["results"].as_array().unwrap().is_empty());
        assert_eq!(parsed["statistics"]["total"], 3);
    }

    #[test]
    fn test_format_single_result() {
        let formatter = JsonFormatter::new(Verbosity::Normal);
        let report = create_test_report();
        let mut output = Vec::new();

        formatter.format_result(&report.results[1], &mut output).unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["file"], "/w/notes/requirements.txt");
        assert_eq!(parsed["statistics"]["errors"], 1);
        assert!(parsed["timestamp"].is_string());
    }

    #[test]
    fn test_format_summary() {
        let formatter = JsonFormatter::new(Verbosity::Normal);
        let mut output = Vec::new();

        formatter
            .format_summary(&Statistics::default(), &mut output)
            .unwrap();

        let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed["total"], 0);
        assert_eq!(parsed["errors"], 0);
    }
}
