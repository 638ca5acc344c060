//! Packages declared in a manifest

use super::Ecosystem;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Version used when a manifest declares a package without a constraint
pub const ANY_VERSION: &str = "*";

/// One dependency line found in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredPackage {
    /// Package name
    pub name: String,
    /// Raw version constraint as written (may contain operators or be `*`)
    pub declared_version: String,
    /// 1-based line number in the original text
    pub source_line: usize,
    /// Registry family of the package
    pub ecosystem: Ecosystem,
}

impl DeclaredPackage {
    /// Creates a new declared package
    pub fn new(
        name: impl Into<String>,
        declared_version: impl Into<String>,
        source_line: usize,
        ecosystem: Ecosystem,
    ) -> Self {
        Self {
            name: name.into(),
            declared_version: declared_version.into(),
            source_line,
            ecosystem,
        }
    }

    /// Returns true if no version constraint was declared
    pub fn is_unconstrained(&self) -> bool {
        self.declared_version == ANY_VERSION
    }

    /// Returns the `ecosystem:name@version` identity used in cache keys
    pub fn cache_identity(&self) -> String {
        format!(
            "{}:{}@{}",
            self.ecosystem.as_str(),
            self.name,
            self.declared_version
        )
    }
}

impl fmt::Display for DeclaredPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{} [{}] (line {})",
            self.name, self.declared_version, self.ecosystem, self.source_line
        )
    }
}
