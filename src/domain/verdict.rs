//! Per-package verdicts returned by the analysis service

use super::Ecosystem;
use crate::error::RemoteErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Up-to-date judgment for one package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PackageStatus {
    /// Declared version matches the latest release
    UpToDate,
    /// A newer release exists
    Outdated,
    /// The package could not be analyzed
    Error,
}

impl PackageStatus {
    /// Parses the service's status string; unknown values are errors
    pub fn from_wire(value: &str) -> Self {
        match value {
            "up-to-date" => PackageStatus::UpToDate,
            "outdated" => PackageStatus::Outdated,
            _ => PackageStatus::Error,
        }
    }

    /// Returns the wire/display name of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageStatus::UpToDate => "up-to-date",
            PackageStatus::Outdated => "outdated",
            PackageStatus::Error => "error",
        }
    }
}

impl fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One package's remote-computed status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteVerdict {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
    pub status: PackageStatus,
    pub ecosystem: Ecosystem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Set on verdicts synthesized from a failed remote call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<RemoteErrorKind>,
}

impl RemoteVerdict {
    /// Creates a verdict with no links or error details
    pub fn new(
        name: impl Into<String>,
        current_version: impl Into<String>,
        latest_version: impl Into<String>,
        status: PackageStatus,
        ecosystem: Ecosystem,
    ) -> Self {
        Self {
            name: name.into(),
            current_version: current_version.into(),
            latest_version: latest_version.into(),
            status,
            ecosystem,
            documentation_url: None,
            registry_url: None,
            error_detail: None,
            error_kind: None,
        }
    }

    /// Creates an error verdict for a package
    pub fn error(
        name: impl Into<String>,
        current_version: impl Into<String>,
        ecosystem: Ecosystem,
        detail: impl Into<String>,
    ) -> Self {
        let current_version = current_version.into();
        Self {
            latest_version: current_version.clone(),
            error_detail: Some(detail.into()),
            ..Self::new(name, current_version, String::new(), PackageStatus::Error, ecosystem)
        }
    }

    /// Sets the failure classification (builder pattern)
    pub fn with_error_kind(mut self, kind: RemoteErrorKind) -> Self {
        self.error_kind = Some(kind);
        self
    }

    /// Sets the documentation link (builder pattern)
    pub fn with_documentation_url(mut self, url: Option<String>) -> Self {
        self.documentation_url = url;
        self
    }

    /// Sets the registry page link (builder pattern)
    pub fn with_registry_url(mut self, url: impl Into<String>) -> Self {
        self.registry_url = Some(url.into());
        self
    }

    /// Returns true if the service reported a newer release
    pub fn is_outdated(&self) -> bool {
        self.status == PackageStatus::Outdated
    }
}
