//! Minimal manifest bodies rebuilt from parsed packages
//!
//! The analysis service receives only the declared name/version pairs, never
//! the original file text, so scripts, private fields and comments stay local.

use crate::domain::{DeclaredPackage, ManifestKind};
use serde_json::{Map, Value};

/// Builds a manifest body of the given kind that declares `packages`
pub fn synthesize_manifest(kind: ManifestKind, packages: &[DeclaredPackage]) -> String {
    match kind {
        ManifestKind::PackageJson => package_json(packages),
        ManifestKind::Requirements => requirements_txt(packages),
        ManifestKind::Pubspec => pubspec_yaml(packages),
    }
}

fn package_json(packages: &[DeclaredPackage]) -> String {
    let deps: Map<String, Value> = packages
        .iter()
        .map(|p| (p.name.clone(), Value::String(p.declared_version.clone())))
        .collect();
    let mut root = Map::new();
    root.insert("dependencies".to_string(), Value::Object(deps));
    Value::Object(root).to_string()
}

fn requirements_txt(packages: &[DeclaredPackage]) -> String {
    let mut body = String::new();
    for pkg in packages {
        let version = pkg.declared_version.trim();
        if pkg.is_unconstrained() || version.is_empty() {
            body.push_str(&pkg.name);
        } else if version.starts_with(['=', '<', '>', '~', '!']) {
            body.push_str(&format!("{}{}", pkg.name, version));
        } else {
            body.push_str(&format!("{}=={}", pkg.name, version));
        }
        body.push('\n');
    }
    body
}

fn pubspec_yaml(packages: &[DeclaredPackage]) -> String {
    let mut body = String::from("dependencies:\n");
    for pkg in packages {
        let version = if pkg.is_unconstrained() {
            "any".to_string()
        } else {
            yaml_scalar(&pkg.declared_version)
        };
        body.push_str(&format!("  {}: {}\n", pkg.name, version));
    }
    body
}

/// Quotes a version unless it is a plain YAML scalar
fn yaml_scalar(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '+' | '-' | '_'));
    if plain {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('"', "\\\""))
    }
}
