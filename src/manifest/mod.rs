//! Manifest file detection and parsing
//!
//! This module provides functionality to:
//! - Detect manifest kinds from exact file names
//! - Parse declared packages from package.json, requirements.txt and pubspec.yaml
//! - Discover manifests under a workspace root
//! - Rebuild a minimal manifest body from parsed packages
//!
//! Parsers are pure functions of their input: no I/O and no state shared
//! between calls. They never fail as a whole; problems are reported as
//! `ParseError` values next to whatever packages could be read.

mod detector;
mod package_json;
mod pubspec_yaml;
mod requirements_txt;
mod synthesize;

pub use detector::{build_exclude_set, discover_manifests, DEFAULT_EXCLUDE_PATTERNS};
pub use package_json::PackageJsonParser;
pub use pubspec_yaml::PubspecParser;
pub use requirements_txt::RequirementsParser;
pub use synthesize::synthesize_manifest;

use crate::domain::{DeclaredPackage, ManifestKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A problem found while parsing one manifest
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("line {line}: {message}")]
pub struct ParseError {
    /// 1-based line the problem refers to
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line: line.max(1),
            message: message.into(),
        }
    }
}

/// Packages and problems found in one manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub packages: Vec<DeclaredPackage>,
    pub errors: Vec<ParseError>,
}

impl ParseOutcome {
    /// An outcome with a single error and no packages
    pub fn failed(error: ParseError) -> Self {
        Self {
            packages: Vec::new(),
            errors: vec![error],
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Trait for parsing manifest files
pub trait ManifestParser {
    /// Parse declared packages from manifest content
    fn parse(&self, content: &str) -> ParseOutcome;

    /// Returns the manifest kind this parser handles
    fn kind(&self) -> ManifestKind;
}

/// Get a manifest parser for the specified kind
pub fn get_parser(kind: ManifestKind) -> Box<dyn ManifestParser> {
    match kind {
        ManifestKind::PackageJson => Box::new(PackageJsonParser),
        ManifestKind::Requirements => Box::new(RequirementsParser),
        ManifestKind::Pubspec => Box::new(PubspecParser),
    }
}

/// Detects the manifest kind from an exact file basename
pub fn detect_kind(file_name: &str) -> Option<ManifestKind> {
    ManifestKind::from_file_name(file_name)
}

/// Parses manifest content of a known kind
pub fn parse(content: &str, kind: ManifestKind) -> ParseOutcome {
    get_parser(kind).parse(content)
}

/// Returns the 1-based line containing byte offset `offset`
pub(crate) fn line_of_offset(content: &str, offset: usize) -> usize {
    content[..offset.min(content.len())].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_parser_kinds() {
        assert_eq!(
            get_parser(ManifestKind::PackageJson).kind(),
            ManifestKind::PackageJson
        );
        assert_eq!(
            get_parser(ManifestKind::Requirements).kind(),
            ManifestKind::Requirements
        );
        assert_eq!(get_parser(ManifestKind::Pubspec).kind(), ManifestKind::Pubspec);
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(detect_kind("pubspec.yml"), Some(ManifestKind::Pubspec));
        assert_eq!(detect_kind("Cargo.toml"), None);
    }

    #[test]
    fn test_parse_dispatches_by_kind() {
        let outcome = parse("flask==2.0.1\n", ManifestKind::Requirements);
        assert_eq!(outcome.packages.len(), 1);
        assert_eq!(outcome.packages[0].name, "flask");
    }

    #[test]
    fn test_line_of_offset() {
        let text = "a\nb\nc";
        assert_eq!(line_of_offset(text, 0), 1);
        assert_eq!(line_of_offset(text, 2), 2);
        assert_eq!(line_of_offset(text, 4), 3);
        assert_eq!(line_of_offset(text, 100), 3);
    }

    #[test]
    fn test_parse_error_line_is_at_least_one() {
        assert_eq!(ParseError::new(0, "x").line, 1);
        assert_eq!(ParseError::new(7, "x").to_string(), "line 7: x");
    }
}
