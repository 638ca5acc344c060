//! Integration tests for depwatch
//!
//! These tests verify:
//! - Manifest discovery across a workspace with exclusions
//! - The full pipeline against a mock analysis service
//! - Remote result caching, including cached failures

use depwatch::cache::TtlCache;
use depwatch::delta::{ChangeType, UpdateSeverity};
use depwatch::domain::{Ecosystem, FailureKind, PackageStatus};
use depwatch::error::RemoteErrorKind;
use depwatch::orchestrator::AnalysisOrchestrator;
use depwatch::remote::{HttpClient, RemoteAnalysisClient, RetryPolicy};
use depwatch::workspace::{FileSource, FsFileSource};
use mockito::Matcher;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn orchestrator_for(endpoint: &str, token: Option<&str>) -> AnalysisOrchestrator {
    let files = FsFileSource::with_default_excludes().unwrap();
    let cache = Arc::new(TtlCache::new(100));
    let client = RemoteAnalysisClient::new(endpoint, Arc::new(HttpClient::new().unwrap()), cache)
        .with_token(token.map(str::to_string))
        .with_retry(RetryPolicy::new(2, Duration::from_millis(10)));
    AnalysisOrchestrator::new(Arc::new(files), Arc::new(client))
}

const PACKAGE_JSON: &str = r#"{
  "name": "web",
  "dependencies": {
    "react": "^17.0.2",
    "lodash": "^4.17.21"
  },
  "devDependencies": {
    "left-pad": "1.0.0"
  }
}"#;

fn npm_response() -> String {
    json!({
        "packages": [
            {
                "name": "react",
                "currentVersion": "17.0.2",
                "latestVersion": "18.2.0",
                "status": "outdated",
                "packageManager": "npm",
                "homepage": "https://react.dev"
            },
            {
                "name": "lodash",
                "currentVersion": "4.17.21",
                "latestVersion": "4.17.21",
                "status": "up-to-date",
                "packageManager": "npm"
            }
        ]
    })
    .to_string()
}

mod discovery {
    use super::*;

    #[tokio::test]
    async fn test_discover_all_manifest_kinds() {
        let temp_dir = create_test_dir();
        write(temp_dir.path(), "package.json", "{}");
        write(temp_dir.path(), "api/requirements.txt", "flask==2.0.1\n");
        write(temp_dir.path(), "mobile/pubspec.yaml", "name: app\n");
        write(temp_dir.path(), "legacy/pubspec.yml", "name: old\n");
        write(temp_dir.path(), "README.md", "# not a manifest\n");

        let source = FsFileSource::with_default_excludes().unwrap();
        let found = source.discover(temp_dir.path()).await.unwrap();

        let relative: Vec<_> = found
            .iter()
            .map(|p| p.strip_prefix(temp_dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(relative.len(), 4);
        assert!(relative.contains(&Path::new("package.json").to_path_buf()));
        assert!(relative.contains(&Path::new("api/requirements.txt").to_path_buf()));
        assert!(relative.contains(&Path::new("mobile/pubspec.yaml").to_path_buf()));
        assert!(relative.contains(&Path::new("legacy/pubspec.yml").to_path_buf()));
    }

    #[tokio::test]
    async fn test_discover_skips_default_exclusions() {
        let temp_dir = create_test_dir();
        write(temp_dir.path(), "package.json", "{}");
        write(temp_dir.path(), "node_modules/react/package.json", "{}");
        write(temp_dir.path(), ".venv/lib/requirements.txt", "six\n");
        write(temp_dir.path(), ".dart_tool/pubspec.yaml", "name: x\n");
        write(temp_dir.path(), "dist/package.json", "{}");

        let source = FsFileSource::with_default_excludes().unwrap();
        let found = source.discover(temp_dir.path()).await.unwrap();

        assert_eq!(found, vec![temp_dir.path().join("package.json")]);
    }

    #[tokio::test]
    async fn test_discover_results_are_sorted() {
        let temp_dir = create_test_dir();
        write(temp_dir.path(), "b/package.json", "{}");
        write(temp_dir.path(), "a/package.json", "{}");
        write(temp_dir.path(), "c/requirements.txt", "");

        let source = FsFileSource::with_default_excludes().unwrap();
        let found = source.discover(temp_dir.path()).await.unwrap();

        let mut sorted = found.clone();
        sorted.sort();
        assert_eq!(found, sorted);
    }
}

mod pipeline {
    use super::*;

    #[tokio::test]
    async fn test_analyze_package_json_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze-packages")
            .match_body(Matcher::PartialJson(json!({ "fileName": "package.json" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(npm_response())
            .create_async()
            .await;

        let temp_dir = create_test_dir();
        write(temp_dir.path(), "package.json", PACKAGE_JSON);
        let orchestrator = orchestrator_for(&server.url(), None);

        let result = orchestrator
            .analyze_file(&temp_dir.path().join("package.json"))
            .await;

        mock.assert_async().await;
        assert!(result.failure.is_none());
        assert_eq!(result.packages.len(), 3);
        assert_eq!(result.statistics.total, 3);
        assert_eq!(result.statistics.outdated, 1);
        assert_eq!(result.statistics.up_to_date, 1);
        assert_eq!(result.statistics.errors, 1);

        let react = &result.packages[0];
        assert_eq!(react.name, "react");
        assert_eq!(react.status, PackageStatus::Outdated);
        assert_eq!(react.source_line, 4);
        assert_eq!(react.change_type, Some(ChangeType::Major));
        assert_eq!(react.update_severity, Some(UpdateSeverity::Critical));
        assert_eq!(react.documentation_url.as_deref(), Some("https://react.dev"));
        assert_eq!(
            react.registry_url.as_deref(),
            Some("https://www.npmjs.com/package/react")
        );

        let lodash = &result.packages[1];
        assert_eq!(lodash.status, PackageStatus::UpToDate);
        assert!(lodash.change_type.is_none());

        // declared but missing from the response
        let left_pad = &result.packages[2];
        assert_eq!(left_pad.status, PackageStatus::Error);
        assert_eq!(left_pad.source_line, 8);
        assert!(left_pad.error_detail.is_some());
    }

    #[tokio::test]
    async fn test_requirements_maps_pip_to_pypi() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze-packages")
            .match_body(Matcher::PartialJson(
                json!({ "fileName": "requirements.txt" }),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "packages": [{
                        "name": "flask",
                        "currentVersion": "2.0.1",
                        "latestVersion": "2.3.3",
                        "status": "outdated",
                        "packageManager": "pip"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let temp_dir = create_test_dir();
        write(
            temp_dir.path(),
            "requirements.txt",
            "# web deps\nflask==2.0.1\n",
        );
        let orchestrator = orchestrator_for(&server.url(), None);

        let result = orchestrator
            .analyze_file(&temp_dir.path().join("requirements.txt"))
            .await;

        mock.assert_async().await;
        let flask = &result.packages[0];
        assert_eq!(flask.ecosystem, Ecosystem::Pypi);
        assert_eq!(flask.source_line, 2);
        assert_eq!(flask.change_type, Some(ChangeType::Minor));
        assert_eq!(flask.update_severity, Some(UpdateSeverity::Normal));
        assert_eq!(
            flask.registry_url.as_deref(),
            Some("https://pypi.org/project/flask/")
        );
    }

    #[tokio::test]
    async fn test_parse_failure_makes_no_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze-packages")
            .expect(0)
            .create_async()
            .await;

        let temp_dir = create_test_dir();
        write(temp_dir.path(), "package.json", "{ \"dependencies\": ");
        let orchestrator = orchestrator_for(&server.url(), None);

        let result = orchestrator
            .analyze_file(&temp_dir.path().join("package.json"))
            .await;

        mock.assert_async().await;
        let failure = result.failure.as_ref().unwrap();
        assert_eq!(failure.kind, FailureKind::ParseFailure);
        assert_eq!(result.statistics.total, 1);
        assert_eq!(result.statistics.errors, 1);
    }

    #[tokio::test]
    async fn test_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze-packages")
            .match_header("authorization", "Bearer s3cret")
            .with_status(200)
            .with_body(npm_response())
            .create_async()
            .await;

        let temp_dir = create_test_dir();
        write(temp_dir.path(), "package.json", PACKAGE_JSON);
        let orchestrator = orchestrator_for(&server.url(), Some("s3cret"));

        orchestrator
            .analyze_file(&temp_dir.path().join("package.json"))
            .await;

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_workspace_report_and_partitions() {
        let mut server = mockito::Server::new_async().await;
        let _npm = server
            .mock("POST", "/api/analyze-packages")
            .match_body(Matcher::PartialJson(json!({ "fileName": "package.json" })))
            .with_status(200)
            .with_body(npm_response())
            .create_async()
            .await;
        let _pub = server
            .mock("POST", "/api/analyze-packages")
            .match_body(Matcher::PartialJson(json!({ "fileName": "pubspec.yaml" })))
            .with_status(200)
            .with_body(
                json!({
                    "packages": [{
                        "name": "http",
                        "currentVersion": "0.13.6",
                        "latestVersion": "0.13.6",
                        "status": "up-to-date",
                        "packageManager": "pub"
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let web = create_test_dir();
        let mobile = create_test_dir();
        write(web.path(), "package.json", PACKAGE_JSON);
        write(web.path(), "node_modules/x/package.json", PACKAGE_JSON);
        write(
            mobile.path(),
            "pubspec.yaml",
            "name: app\ndependencies:\n  http: ^0.13.6\n",
        );

        let orchestrator = orchestrator_for(&server.url(), None);
        assert!(orchestrator.add_workspace_folder(web.path()));
        assert!(orchestrator.add_workspace_folder(mobile.path()));

        let report = orchestrator.analyze_workspace().await;

        assert_eq!(report.results.len(), 2);
        assert_eq!(report.statistics.total, 4);
        assert_eq!(report.statistics.outdated, 1);
        assert_eq!(report.statistics.up_to_date, 2);
        assert_eq!(report.statistics.errors, 1);
        assert_eq!(report.files_with_errors, 1);

        let web_summary = orchestrator.workspace_summary(web.path());
        assert_eq!(web_summary.total, 3);
        let mobile_summary = orchestrator.workspace_summary(mobile.path());
        assert_eq!(mobile_summary.total, 1);
        assert_eq!(mobile_summary.up_to_date, 1);

        orchestrator.remove_workspace_folder(web.path());
        assert!(orchestrator.workspace_results(web.path()).is_empty());
        assert_eq!(orchestrator.cached_results().len(), 1);
    }

    #[tokio::test]
    async fn test_unchanged_declarations_hit_the_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze-packages")
            .with_status(200)
            .with_body(npm_response())
            .expect(1)
            .create_async()
            .await;

        let temp_dir = create_test_dir();
        let path = temp_dir.path().join("package.json");
        write(temp_dir.path(), "package.json", PACKAGE_JSON);
        let orchestrator = orchestrator_for(&server.url(), None);

        let first = orchestrator.analyze_file(&path).await;
        // reformatting alone does not change the cache key
        write(
            temp_dir.path(),
            "package.json",
            &PACKAGE_JSON.replace("  ", "    "),
        );
        let second = orchestrator.analyze_file(&path).await;

        mock.assert_async().await;
        assert_eq!(first.statistics, second.statistics);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_auth_failure_is_cached_and_classified() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze-packages")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;

        let temp_dir = create_test_dir();
        let path = temp_dir.path().join("package.json");
        write(temp_dir.path(), "package.json", PACKAGE_JSON);
        let orchestrator = orchestrator_for(&server.url(), None);

        let result = orchestrator.analyze_file(&path).await;
        orchestrator.analyze_file(&path).await;

        mock.assert_async().await;
        assert!(result.failure.is_none());
        assert_eq!(result.statistics.errors, 3);
        assert!(result
            .packages
            .iter()
            .all(|p| p.error_kind == Some(RemoteErrorKind::Auth)));
    }

    #[tokio::test]
    async fn test_clear_cache_forces_new_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/analyze-packages")
            .with_status(200)
            .with_body(npm_response())
            .expect(2)
            .create_async()
            .await;

        let temp_dir = create_test_dir();
        let path = temp_dir.path().join("package.json");
        write(temp_dir.path(), "package.json", PACKAGE_JSON);
        let orchestrator = orchestrator_for(&server.url(), None);

        orchestrator.analyze_file(&path).await;
        orchestrator.clear_cache();
        assert!(orchestrator.cached_result(&path).is_none());
        orchestrator.analyze_file(&path).await;

        mock.assert_async().await;
    }
}
