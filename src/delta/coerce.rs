//! Version string normalization
//!
//! Turns loosely written versions (`^1.2`, `>=2.0.0`, `v3`, `~=1.4.2`,
//! `1.0.0-beta.1`) into a three-component `semver::Version`.

use regex::Regex;
use semver::{Prerelease, Version};
use std::sync::LazyLock;

/// Range operators stripped from the front of a version string
const RANGE_OPERATORS: &[char] = &['~', '^', '>', '=', '<', '!'];

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:\.(\d+))?(?:\.(\d+))?(?:-([0-9A-Za-z.-]+))?").unwrap()
});

/// Strips leading range operators, whitespace and a leading `v`
pub fn normalize(version: &str) -> &str {
    let trimmed = version
        .trim()
        .trim_start_matches(|c: char| RANGE_OPERATORS.contains(&c) || c.is_whitespace());
    trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
}

/// Coerces a version string to the nearest valid three-component version
///
/// Missing minor/patch components are padded with zeros. Anything after the
/// numeric core other than a pre-release tag is ignored (build metadata,
/// a second constraint of a range, wildcards).
pub fn coerce(version: &str) -> Option<Version> {
    let normalized = normalize(version);
    let caps = VERSION_RE.captures(normalized)?;

    let component = |idx: usize| -> Option<u64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };

    let mut coerced = Version::new(component(1)?, component(2)?, component(3)?);
    if let Some(pre) = caps.get(4) {
        // A malformed tag is dropped rather than failing the whole version
        coerced.pre = Prerelease::new(pre.as_str().trim_end_matches(['.', '-']))
            .unwrap_or(Prerelease::EMPTY);
    }
    Some(coerced)
}
