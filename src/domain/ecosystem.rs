//! Ecosystem and manifest kind definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Package registry families understood by the analysis service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// npm registry (package.json)
    Npm,
    /// Python Package Index (requirements.txt)
    Pypi,
    /// Dart/Flutter pub.dev (pubspec.yaml)
    Pub,
}

impl Ecosystem {
    /// Returns the identifier used in cache keys and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Pypi => "pypi",
            Ecosystem::Pub => "pub",
        }
    }

    /// Maps the service's `packageManager` value to an ecosystem
    ///
    /// The service reports Python packages as `pip`.
    pub fn from_package_manager(value: &str) -> Option<Self> {
        match value {
            "npm" => Some(Ecosystem::Npm),
            "pip" | "pypi" => Some(Ecosystem::Pypi),
            "pub" => Some(Ecosystem::Pub),
            _ => None,
        }
    }

    /// Returns the public registry page for a package
    pub fn registry_url(&self, package: &str) -> String {
        match self {
            Ecosystem::Npm => format!("https://www.npmjs.com/package/{}", package),
            Ecosystem::Pypi => format!("https://pypi.org/project/{}/", package),
            Ecosystem::Pub => format!("https://pub.dev/packages/{}", package),
        }
    }

    /// Returns the display name for this ecosystem
    pub fn display_name(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Pypi => "PyPI",
            Ecosystem::Pub => "pub",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// The manifest formats depwatch can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManifestKind {
    /// package.json
    PackageJson,
    /// requirements.txt
    Requirements,
    /// pubspec.yaml / pubspec.yml
    Pubspec,
}

impl ManifestKind {
    /// Detects the manifest kind from an exact file basename
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match file_name {
            "package.json" => Some(ManifestKind::PackageJson),
            "requirements.txt" => Some(ManifestKind::Requirements),
            "pubspec.yaml" | "pubspec.yml" => Some(ManifestKind::Pubspec),
            _ => None,
        }
    }

    /// Detects the manifest kind from the last component of a path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.file_name()
            .and_then(|n| n.to_str())
            .and_then(Self::from_file_name)
    }

    /// Returns the ecosystem of packages declared in this manifest kind
    pub fn ecosystem(&self) -> Ecosystem {
        match self {
            ManifestKind::PackageJson => Ecosystem::Npm,
            ManifestKind::Requirements => Ecosystem::Pypi,
            ManifestKind::Pubspec => Ecosystem::Pub,
        }
    }

    /// Returns the canonical file name sent to the analysis service
    pub fn canonical_file_name(&self) -> &'static str {
        match self {
            ManifestKind::PackageJson => "package.json",
            ManifestKind::Requirements => "requirements.txt",
            ManifestKind::Pubspec => "pubspec.yaml",
        }
    }

    /// Returns every file name recognized as a manifest
    pub fn all_file_names() -> &'static [&'static str] {
        &[
            "package.json",
            "requirements.txt",
            "pubspec.yaml",
            "pubspec.yml",
        ]
    }
}

impl From<Ecosystem> for ManifestKind {
    fn from(ecosystem: Ecosystem) -> Self {
        match ecosystem {
            Ecosystem::Npm => ManifestKind::PackageJson,
            Ecosystem::Pypi => ManifestKind::Requirements,
            Ecosystem::Pub => ManifestKind::Pubspec,
        }
    }
}
