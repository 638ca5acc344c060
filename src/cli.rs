//! CLI argument parsing module for depwatch

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Environment variable holding the bearer credential
pub const TOKEN_ENV: &str = "DEPWATCH_TOKEN";

/// Environment variable holding the analysis endpoint
pub const ENDPOINT_ENV: &str = "DEPWATCH_ENDPOINT";

/// Dependency manifest analyzer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "depwatch",
    version,
    about = "Reports outdated packages in package.json, requirements.txt and pubspec.yaml"
)]
pub struct CliArgs {
    /// Workspace roots to scan (default: current directory when no --file is given)
    pub roots: Vec<PathBuf>,

    /// Analyze a single manifest file (can be specified multiple times)
    #[arg(short, long = "file", action = ArgAction::Append)]
    pub files: Vec<PathBuf>,

    // Service options
    /// Base URL of the analysis service
    #[arg(long, env = ENDPOINT_ENV)]
    pub endpoint: Option<String>,

    /// Bearer token for the analysis service
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    pub token: Option<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Additional glob to exclude from discovery (can be specified multiple times)
    #[arg(long, action = ArgAction::Append)]
    pub exclude: Vec<String>,

    // Output options
    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Roots to scan: the given ones, or `.` when neither roots nor files are given
    pub fn scan_roots(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() && self.files.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.roots.clone()
        }
    }
}
