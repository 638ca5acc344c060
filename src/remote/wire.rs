//! Request and response bodies of the analysis API
//!
//! `POST <endpoint>/api/analyze-packages`

use serde::{Deserialize, Serialize};

/// Path appended to the configured endpoint
pub const ANALYZE_PATH: &str = "/api/analyze-packages";

/// Request body: a synthesized manifest and its canonical file name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub content: String,
    pub file_name: String,
}

/// Success body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default)]
    pub packages: Vec<WirePackage>,
}

/// One package entry in the success body
///
/// Every field is optional on the wire; missing strings decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WirePackage {
    pub name: String,
    pub current_version: String,
    pub latest_version: String,
    pub status: String,
    pub package_manager: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
