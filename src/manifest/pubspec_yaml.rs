//! pubspec.yaml parser for Dart/Flutter projects
//!
//! Handles:
//! - dependencies
//! - dev_dependencies
//!
//! Only one nesting level is read. Entries whose value is a nested mapping
//! (`sdk:`, `git:`, `path:` and hosted specs) are skipped, as is anything
//! indented deeper than the first entry of the block. Any non-blank line
//! at column 0, a comment included, ends the block.

use crate::domain::{DeclaredPackage, Ecosystem, ManifestKind, ANY_VERSION};
use crate::manifest::{ManifestParser, ParseOutcome};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*):\s*(.*?)\s*$").unwrap());

const BLOCK_HEADERS: &[&str] = &["dependencies:", "dev_dependencies:"];

/// Parser for pubspec.yaml files
pub struct PubspecParser;

/// An open dependency block
struct Block {
    header_indent: usize,
    entry_indent: Option<usize>,
}

impl ManifestParser for PubspecParser {
    fn parse(&self, content: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        let mut block: Option<Block> = None;

        for (idx, raw_line) in content.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let indent = indent_of(raw_line);
            let is_comment = trimmed.starts_with('#');

            if !is_comment && BLOCK_HEADERS.contains(&strip_comment(trimmed)) {
                block = Some(Block {
                    header_indent: indent,
                    entry_indent: None,
                });
                continue;
            }

            let Some(current) = block.as_mut() else {
                continue;
            };
            // Any column-0 line closes the block, comments included
            if indent == 0 || (!is_comment && indent <= current.header_indent) {
                block = None;
                continue;
            }
            if is_comment {
                continue;
            }

            let entry_indent = *current.entry_indent.get_or_insert(indent);
            if indent > entry_indent {
                debug!(line = line_no, "skipping nested pubspec entry");
                continue;
            }

            let Some(caps) = ENTRY_RE.captures(strip_comment(trimmed)) else {
                continue;
            };
            let value = unquote(&caps[2]);
            if value.is_empty() {
                // Mapping-valued dependency (sdk, git, path or hosted)
                continue;
            }
            let version = if value == "any" { ANY_VERSION } else { value };
            outcome.packages.push(DeclaredPackage::new(
                &caps[1],
                version,
                line_no,
                Ecosystem::Pub,
            ));
        }

        outcome
    }

    fn kind(&self) -> ManifestKind {
        ManifestKind::Pubspec
    }
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Drops a trailing ` # comment`
fn strip_comment(line: &str) -> &str {
    match line.find(" #") {
        Some(pos) => line[..pos].trim_end(),
        None => line,
    }
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}
