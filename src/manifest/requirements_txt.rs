//! requirements.txt parser for Python projects
//!
//! One declaration per line:
//! - `name<op><version>` where `<op>` is one or more of `= < > ~ !`
//! - bare `name` (declared as `*`)
//! - extras (`name[security]`) and environment markers (`; python_version < "3.9"`)
//!   are dropped
//!
//! Blank lines and `#` comments are skipped. Any other line is reported as a
//! `ParseError` and parsing continues with the next line.

use crate::domain::{DeclaredPackage, Ecosystem, ManifestKind, ANY_VERSION};
use crate::manifest::{ManifestParser, ParseError, ParseOutcome};
use regex::Regex;
use std::sync::LazyLock;

static CONSTRAINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?\s*([=<>~!]+)\s*(\S.*)$").unwrap()
});
static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)\s*(?:\[[^\]]*\])?$").unwrap());

/// Parser for requirements.txt files
pub struct RequirementsParser;

impl ManifestParser for RequirementsParser {
    fn parse(&self, content: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();

        for (idx, raw_line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let Some(line) = strip_line(raw_line) else {
                continue;
            };

            if let Some(caps) = CONSTRAINED_RE.captures(line) {
                let version = format!("{}{}", &caps[2], caps[3].trim());
                outcome.packages.push(DeclaredPackage::new(
                    &caps[1],
                    version,
                    line_no,
                    Ecosystem::Pypi,
                ));
            } else if let Some(caps) = BARE_RE.captures(line) {
                outcome.packages.push(DeclaredPackage::new(
                    &caps[1],
                    ANY_VERSION,
                    line_no,
                    Ecosystem::Pypi,
                ));
            } else {
                outcome.errors.push(ParseError::new(
                    line_no,
                    format!("unrecognized requirement '{}'", raw_line.trim()),
                ));
            }
        }

        outcome
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::Requirements
    }
}

/// Returns the declaration part of a line, or None for blank/comment lines
fn strip_line(raw: &str) -> Option<&str> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    // Inline comments need leading whitespace, as in pip
    let line = match line.find(" #").or_else(|| line.find("\t#")) {
        Some(pos) => &line[..pos],
        None => line,
    };
    // A marker with no requirement before it leaves "", which matches nothing
    Some(line.split(';').next().unwrap_or(line).trim())
}
