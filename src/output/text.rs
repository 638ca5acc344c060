//! Text output formatter for human-readable display
//!
//! This module provides:
//! - Per-file listing of outdated and failing packages with colors
//! - Change type and update severity markers
//! - Whole-file failures with their line hint
//! - Summary with detailed breakdown

use crate::delta::{ChangeType, UpdateSeverity};
use crate::domain::{AnalysisResult, PackageAnalysis, PackageStatus, Statistics};
use crate::orchestrator::WorkspaceReport;
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn change_label(&self, change: ChangeType) -> String {
        let label = change.to_string();
        if !self.color {
            return label;
        }
        match change {
            ChangeType::Major => label.red().bold().to_string(),
            ChangeType::Minor => label.yellow().to_string(),
            ChangeType::Patch => label.green().to_string(),
            ChangeType::None | ChangeType::Error => label.dimmed().to_string(),
        }
    }

    fn severity_label(&self, severity: UpdateSeverity) -> String {
        let label = severity.to_string();
        if !self.color {
            return label;
        }
        match severity {
            UpdateSeverity::Critical => label.red().bold().to_string(),
            UpdateSeverity::Important => label.yellow().to_string(),
            UpdateSeverity::Normal | UpdateSeverity::None => label.dimmed().to_string(),
        }
    }

    /// Whether a package gets its own line at this verbosity
    fn is_listed(&self, package: &PackageAnalysis) -> bool {
        match package.status {
            PackageStatus::UpToDate => self.verbosity == Verbosity::Verbose,
            PackageStatus::Outdated | PackageStatus::Error => true,
        }
    }

    fn format_package_line(
        &self,
        package: &PackageAnalysis,
        max_name_len: usize,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let name = format!("{:width$}", package.name, width = max_name_len);
        let line = format!("L{}", package.source_line);

        match package.status {
            PackageStatus::Outdated => {
                let markers = match (package.change_type, package.update_severity) {
                    (Some(change), Some(severity)) => format!(
                        " [{}, {}]",
                        self.change_label(change),
                        self.severity_label(severity)
                    ),
                    _ => String::new(),
                };
                if self.color {
                    writeln!(
                        writer,
                        "  {} {} {} {} {}{}",
                        line.dimmed(),
                        name,
                        package.current_version.dimmed(),
                        "→".dimmed(),
                        package.latest_version.bright_white().bold(),
                        markers
                    )
                } else {
                    writeln!(
                        writer,
                        "  {} {} {} -> {}{}",
                        line, name, package.current_version, package.latest_version, markers
                    )
                }
            }
            PackageStatus::Error => {
                let detail = package.error_detail.as_deref().unwrap_or("unknown error");
                if self.color {
                    writeln!(
                        writer,
                        "  {} {} {} {}",
                        line.dimmed(),
                        name,
                        "✗".red(),
                        detail.red()
                    )
                } else {
                    writeln!(writer, "  {} {} error: {}", line, name, detail)
                }
            }
            PackageStatus::UpToDate => {
                if self.color {
                    writeln!(
                        writer,
                        "  {} {} {} {}",
                        line.dimmed(),
                        name.dimmed(),
                        package.current_version.dimmed(),
                        "✓".green()
                    )
                } else {
                    writeln!(writer, "  {} {} {} (up to date)", line, name, package.current_version)
                }
            }
        }
    }

    /// Count outdated packages by change type: (major, minor, patch, other)
    fn count_by_change_type(&self, report: &WorkspaceReport) -> (usize, usize, usize, usize) {
        let mut counts = (0, 0, 0, 0);
        for package in report.results.iter().flat_map(|r| r.outdated()) {
            match package.change_type {
                Some(ChangeType::Major) => counts.0 += 1,
                Some(ChangeType::Minor) => counts.1 += 1,
                Some(ChangeType::Patch) => counts.2 += 1,
                _ => counts.3 += 1,
            }
        }
        counts
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &WorkspaceReport, writer: &mut dyn Write) -> std::io::Result<()> {
        // In quiet mode, only show summary
        if self.verbosity == Verbosity::Quiet {
            return self.format_summary(&report.statistics, writer);
        }

        for result in &report.results {
            self.format_result(result, writer)?;
        }

        self.format_summary(&report.statistics, writer)?;

        let (major, minor, patch, other) = self.count_by_change_type(report);
        if report.statistics.outdated > 0 {
            let mut parts = Vec::new();
            for (count, label) in [(major, "major"), (minor, "minor"), (patch, "patch"), (other, "other")] {
                if count > 0 {
                    parts.push(format!("{} {}", count, label));
                }
            }
            writeln!(writer, "  outdated by change: {}", parts.join(", "))?;
        }
        if report.has_errors() {
            writeln!(writer, "  {} file(s) with errors", report.files_with_errors)?;
        }

        Ok(())
    }

    fn format_summary(
        &self,
        statistics: &Statistics,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.color {
            writeln!(
                writer,
                "{}: {} packages, {} up to date, {} outdated, {} errors",
                "Summary".bold(),
                statistics.total,
                statistics.up_to_date.to_string().green(),
                statistics.outdated.to_string().yellow(),
                statistics.errors.to_string().red()
            )
        } else {
            writeln!(
                writer,
                "Summary: {} packages, {} up to date, {} outdated, {} errors",
                statistics.total, statistics.up_to_date, statistics.outdated, statistics.errors
            )
        }
    }

    fn format_result(
        &self,
        result: &AnalysisResult,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        let path_display = result.file.display().to_string();

        if let Some(failure) = &result.failure {
            let location = failure
                .line
                .map(|l| format!(" (line {})", l))
                .unwrap_or_default();
            if self.color {
                writeln!(
                    writer,
                    "{} {} {}: {}{}",
                    "✗".red(),
                    path_display.bold(),
                    failure.kind.to_string().red(),
                    failure.message,
                    location
                )?;
            } else {
                writeln!(
                    writer,
                    "{}: {}: {}{}",
                    path_display, failure.kind, failure.message, location
                )?;
            }
            return writeln!(writer);
        }

        let listed: Vec<&PackageAnalysis> =
            result.packages.iter().filter(|p| self.is_listed(p)).collect();

        // Skip files with nothing to report
        if listed.is_empty() && self.verbosity != Verbosity::Verbose {
            return Ok(());
        }

        let stats = &result.statistics;
        let ecosystem = result
            .kind
            .map(|k| format!(" ({})", k.ecosystem()))
            .unwrap_or_default();
        if self.color {
            writeln!(
                writer,
                "{}{} {} outdated, {} errors",
                path_display.bold(),
                ecosystem.dimmed(),
                stats.outdated.to_string().yellow(),
                stats.errors.to_string().red()
            )?;
        } else {
            writeln!(
                writer,
                "{}{} {} outdated, {} errors",
                path_display, ecosystem, stats.outdated, stats.errors
            )?;
        }

        let max_name_len = listed.iter().map(|p| p.name.len()).max().unwrap_or(0).max(20);
        for package in listed {
            self.format_package_line(package, max_name_len, writer)?;
        }

        writeln!(writer)
    }
}
