//! Manifest discovery under a workspace root
//!
//! Features:
//! - Finds package.json, requirements.txt and pubspec.yaml/pubspec.yml by exact name
//! - Prunes excluded directories (dependency, build and VCS folders by default)
//! - Returns paths in a stable, sorted order

use crate::domain::ManifestKind;
use crate::error::ConfigError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directories excluded from discovery unless overridden
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &[
    "**/node_modules/**",
    "**/.git/**",
    "**/dist/**",
    "**/build/**",
    "**/out/**",
    "**/.venv/**",
    "**/venv/**",
    "**/__pycache__/**",
    "**/.dart_tool/**",
    "**/target/**",
];

/// Compiles exclusion globs into a single matcher
pub fn build_exclude_set<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ConfigError::InvalidPattern {
        pattern: patterns
            .iter()
            .map(|p| p.as_ref())
            .collect::<Vec<_>>()
            .join(", "),
        message: e.to_string(),
    })
}

/// Finds every manifest under `root` that is not excluded
///
/// Unreadable entries are logged and skipped.
pub fn discover_manifests(root: &Path, exclude: &GlobSet) -> Vec<PathBuf> {
    let mut manifests: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_excluded(root, entry, exclude))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry during discovery");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| ManifestKind::from_path(entry.path()).is_some())
        .map(DirEntry::into_path)
        .collect();

    manifests.sort();
    debug!(root = %root.display(), count = manifests.len(), "discovered manifests");
    manifests
}

fn is_excluded(root: &Path, entry: &DirEntry, exclude: &GlobSet) -> bool {
    let Ok(relative) = entry.path().strip_prefix(root) else {
        return false;
    };
    if relative.as_os_str().is_empty() {
        return false;
    }
    let relative = relative.to_string_lossy().replace('\\', "/");
    if exclude.is_match(&relative) {
        return true;
    }
    // `**/dir/**` only matches below the directory, so also test with a trailing slash
    entry.file_type().is_dir() && exclude.is_match(format!("{}/", relative))
}
