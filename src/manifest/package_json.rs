//! package.json parser for Node.js projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//!
//! A name present in both sections yields two independent packages.

use crate::domain::{DeclaredPackage, Ecosystem, ManifestKind, ANY_VERSION};
use crate::manifest::{line_of_offset, ManifestParser, ParseError, ParseOutcome};
use serde_json::{Map, Value};

/// Sections read from package.json, in output order
const SECTIONS: &[&str] = &["dependencies", "devDependencies"];

/// Parser for package.json files
pub struct PackageJsonParser;

impl ManifestParser for PackageJsonParser {
    fn parse(&self, content: &str) -> ParseOutcome {
        let json: Value = match serde_json::from_str(content) {
            Ok(json) => json,
            Err(e) => return ParseOutcome::failed(ParseError::new(e.line(), e.to_string())),
        };

        let mut outcome = ParseOutcome::default();
        for section in SECTIONS {
            if let Some(deps) = json.get(*section).and_then(Value::as_object) {
                parse_dependency_object(content, section, deps, &mut outcome.packages);
            }
        }
        outcome
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::PackageJson
    }
}

fn parse_dependency_object(
    content: &str,
    section: &str,
    deps: &Map<String, Value>,
    output: &mut Vec<DeclaredPackage>,
) {
    for (name, version_value) in deps {
        let version = version_value.as_str().unwrap_or(ANY_VERSION);
        let version = if version.trim().is_empty() {
            ANY_VERSION
        } else {
            version
        };
        let line = locate_line(content, section, name).unwrap_or(1);
        output.push(DeclaredPackage::new(
            name.clone(),
            version,
            line,
            Ecosystem::Npm,
        ));
    }
}

/// Finds the line of `"name"` after the `"section"` header in raw text
///
/// Best-effort: a package name that also appears as a string value between
/// the header and its key is mis-located.
fn locate_line(content: &str, section: &str, name: &str) -> Option<usize> {
    let header = format!("\"{}\"", section);
    let header_pos = content.find(&header)? + header.len();
    let key = format!("\"{}\"", name);
    let key_pos = content[header_pos..].find(&key)? + header_pos;
    Some(line_of_offset(content, key_pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> ParseOutcome {
        PackageJsonParser.parse(content)
    }

    #[test]
    fn test_parse_simple_dependencies() {
        let content = r#"{
  "name": "app",
  "dependencies": {
    "lodash": "^4.17.21",
    "express": "~4.18.2"
  }
}"#;

        let outcome = parse(content);
        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.packages.len(), 2);

        let lodash = &outcome.packages[0];
        assert_eq!(lodash.name, "lodash");
        assert_eq!(lodash.declared_version, "^4.17.21");
        assert_eq!(lodash.source_line, 4);
        assert_eq!(lodash.ecosystem, Ecosystem::Npm);

        let express = &outcome.packages[1];
        assert_eq!(express.name, "express");
        assert_eq!(express.source_line, 5);
    }

    #[test]
    fn test_parse_keeps_declaration_order() {
        let content = r#"{"dependencies": {"zod": "^3.0.0", "axios": "^1.0.0", "lodash": "^4.0.0"}}"#;
        let names: Vec<_> = parse(content)
            .packages
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["zod", "axios", "lodash"]);
    }

    #[test]
    fn test_parse_dev_dependencies_lines() {
        let content = r#"{
  "dependencies": {
    "react": "^18.2.0"
  },
  "devDependencies": {
    "typescript": "^5.0.0"
  }
}"#;

        let outcome = parse(content);
        assert_eq!(outcome.packages.len(), 2);
        assert_eq!(outcome.packages[0].source_line, 3);
        assert_eq!(outcome.packages[1].name, "typescript");
        assert_eq!(outcome.packages[1].source_line, 6);
    }

    #[test]
    fn test_same_name_in_both_sections_yields_two_packages() {
        let content = r#"{
  "dependencies": {
    "react": "^18.0.0"
  },
  "devDependencies": {
    "react": "^18.2.0"
  }
}"#;

        let outcome = parse(content);
        assert_eq!(outcome.packages.len(), 2);
        assert_eq!(outcome.packages[0].declared_version, "^18.0.0");
        assert_eq!(outcome.packages[0].source_line, 3);
        assert_eq!(outcome.packages[1].declared_version, "^18.2.0");
        assert_eq!(outcome.packages[1].source_line, 6);
    }

    #[test]
    fn test_parse_ignores_other_sections() {
        let content = r#"{
  "peerDependencies": { "react": "^18.0.0" },
  "scripts": { "build": "tsc" }
}"#;
        let outcome = parse(content);
        assert!(outcome.packages.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_parse_empty_object() {
        let outcome = parse("{}");
        assert!(outcome.packages.is_empty());
        assert!(!outcome.has_errors());
    }

    #[test]
    fn test_parse_invalid_json_reports_line() {
        let content = "{\n  \"dependencies\": {\n    \"a\": \"1.0.0\",\n  }\n}";
        let outcome = parse(content);
        assert!(outcome.packages.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].line, 4);
    }

    #[test]
    fn test_parse_garbage_defaults_to_line_one() {
        let outcome = parse("not json");
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].line, 1);
    }

    #[test]
    fn test_non_string_version_is_unconstrained() {
        let outcome = parse(r#"{"dependencies": {"odd": 5, "blank": ""}}"#);
        assert_eq!(outcome.packages[0].declared_version, ANY_VERSION);
        assert_eq!(outcome.packages[1].declared_version, ANY_VERSION);
    }

    #[test]
    fn test_scoped_package_line() {
        let content = "{\n  \"dependencies\": {\n    \"@types/node\": \"^20.0.0\"\n  }\n}";
        let outcome = parse(content);
        assert_eq!(outcome.packages[0].name, "@types/node");
        assert_eq!(outcome.packages[0].source_line, 3);
    }

    #[test]
    fn test_locate_line_falls_back_when_missing() {
        assert_eq!(locate_line("{}", "dependencies", "x"), None);
    }
}
