//! Version delta classification
//!
//! This module provides:
//! - Semantic size of the change between two versions (major/minor/patch)
//! - Update severity tiers derived from the change size
//! - Version string normalization and coercion
//!
//! Classification never fails: malformed versions downgrade to
//! `ChangeType::Error` / `UpdateSeverity::None`. Logging such cases is left
//! to the caller.

mod coerce;

pub use coerce::{coerce, normalize};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default minor-version gap above which a minor update is `important`
pub const DEFAULT_MINOR_GAP_THRESHOLD: u64 = 5;

/// Semantic version change type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Major version change (breaking)
    Major,
    /// Minor version change (features)
    Minor,
    /// Patch version change (fixes), including pre-release-only differences
    Patch,
    /// Versions are equal after coercion
    None,
    /// At least one side could not be coerced
    Error,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeType::Major => "major",
            ChangeType::Minor => "minor",
            ChangeType::Patch => "patch",
            ChangeType::None => "none",
            ChangeType::Error => "error",
        };
        f.write_str(s)
    }
}

/// Urgency tier of an available update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateSeverity {
    None,
    Normal,
    Important,
    Critical,
}

impl fmt::Display for UpdateSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpdateSeverity::None => "none",
            UpdateSeverity::Normal => "normal",
            UpdateSeverity::Important => "important",
            UpdateSeverity::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Classifies the change between two version strings
///
/// The result is a magnitude: a downgrade is classified like the matching
/// upgrade (`2.0.0 -> 1.0.0` is `Major`).
pub fn classify(current: &str, latest: &str) -> ChangeType {
    let (Some(current), Some(latest)) = (coerce(current), coerce(latest)) else {
        return ChangeType::Error;
    };

    if current == latest {
        ChangeType::None
    } else if current.major != latest.major {
        ChangeType::Major
    } else if current.minor != latest.minor {
        ChangeType::Minor
    } else {
        // Same numeric core: either patch differs or only the pre-release tag does
        ChangeType::Patch
    }
}

/// Heuristic mapping from change type to severity
///
/// `major` is always critical (breaking-change assumption). A `minor` update
/// is important once the minor gap exceeds `minor_gap_threshold`. This is a
/// tunable policy, not a correctness guarantee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPolicy {
    pub minor_gap_threshold: u64,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            minor_gap_threshold: DEFAULT_MINOR_GAP_THRESHOLD,
        }
    }
}

impl SeverityPolicy {
    /// Creates a policy with a custom minor gap threshold
    pub fn new(minor_gap_threshold: u64) -> Self {
        Self {
            minor_gap_threshold,
        }
    }

    /// Computes the severity of updating `current` to `latest`
    pub fn severity(&self, current: &str, latest: &str) -> UpdateSeverity {
        match classify(current, latest) {
            ChangeType::None | ChangeType::Error => UpdateSeverity::None,
            ChangeType::Major => UpdateSeverity::Critical,
            ChangeType::Minor => {
                if self.minor_gap(current, latest) > self.minor_gap_threshold {
                    UpdateSeverity::Important
                } else {
                    UpdateSeverity::Normal
                }
            }
            ChangeType::Patch => UpdateSeverity::Normal,
        }
    }

    /// Classifies and rates in one step
    pub fn assess(&self, current: &str, latest: &str) -> (ChangeType, UpdateSeverity) {
        (classify(current, latest), self.severity(current, latest))
    }

    fn minor_gap(&self, current: &str, latest: &str) -> u64 {
        match (coerce(current), coerce(latest)) {
            (Some(c), Some(l)) => c.minor.abs_diff(l.minor),
            _ => 0,
        }
    }
}

/// Computes severity with the default policy
pub fn severity(current: &str, latest: &str) -> UpdateSeverity {
    SeverityPolicy::default().severity(current, latest)
}
