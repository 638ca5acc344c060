//! File system access for the analysis pipeline
//!
//! The orchestrator reads manifests and enumerates workspace roots only
//! through `FileSource`, so tests can substitute in-memory fakes.

use crate::error::{ConfigError, IoError, ManifestError};
use crate::manifest::{build_exclude_set, discover_manifests, DEFAULT_EXCLUDE_PATTERNS};
use async_trait::async_trait;
use globset::GlobSet;
use std::path::{Path, PathBuf};

/// Trait for reading manifests and enumerating workspace roots
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Reads the current text of a file
    async fn read_text(&self, path: &Path) -> Result<String, ManifestError>;

    /// Lists manifest files under `root`, sorted
    async fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, IoError>;
}

/// `FileSource` backed by the local file system
pub struct FsFileSource {
    exclude: GlobSet,
}

impl FsFileSource {
    /// Creates a source that skips paths matching any of `patterns`
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        Ok(Self {
            exclude: build_exclude_set(patterns)?,
        })
    }

    /// Creates a source with the default exclusion list
    pub fn with_default_excludes() -> Result<Self, ConfigError> {
        Self::new(DEFAULT_EXCLUDE_PATTERNS)
    }
}

#[async_trait]
impl FileSource for FsFileSource {
    async fn read_text(&self, path: &Path) -> Result<String, ManifestError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ManifestError::read_error(path, e))
    }

    async fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, IoError> {
        if !tokio::fs::metadata(root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(IoError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        let root = root.to_path_buf();
        let exclude = self.exclude.clone();
        tokio::task::spawn_blocking(move || discover_manifests(&root, &exclude))
            .await
            .map_err(|e| IoError::Generic {
                path: PathBuf::new(),
                source: std::io::Error::other(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_text() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("requirements.txt");
        fs::write(&path, "flask==2.0.1\n").unwrap();

        let source = FsFileSource::with_default_excludes().unwrap();
        assert_eq!(source.read_text(&path).await.unwrap(), "flask==2.0.1\n");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_read_error() {
        let temp = TempDir::new().unwrap();
        let source = FsFileSource::with_default_excludes().unwrap();
        let err = source
            .read_text(&temp.path().join("package.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ManifestError::ReadError { .. }));
    }

    #[tokio::test]
    async fn test_discover_uses_exclusions() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("package.json"), "{}").unwrap();
        fs::create_dir_all(temp.path().join("vendor")).unwrap();
        fs::write(temp.path().join("vendor/package.json"), "{}").unwrap();

        let source = FsFileSource::new(&["**/vendor/**"]).unwrap();
        let found = source.discover(temp.path()).await.unwrap();
        assert_eq!(found, vec![temp.path().join("package.json")]);
    }

    #[tokio::test]
    async fn test_discover_missing_root() {
        let source = FsFileSource::with_default_excludes().unwrap();
        let err = source
            .discover(Path::new("/no/such/workspace"))
            .await
            .unwrap_err();
        assert!(matches!(err, IoError::DirectoryNotFound { .. }));
    }
}
