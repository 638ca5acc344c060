//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues with reading or recognizing manifest files
//! - RemoteError: Issues with the remote analysis service
//! - ConfigError: Issues with configuration values
//! - IoError: File system operation failures

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Remote analysis service errors
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// File name is not one of the supported manifest names
    #[error("unsupported file kind: {path}")]
    UnsupportedFileKind { path: PathBuf },

    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest content could not be parsed
    #[error("failed to parse {path} (line {line}): {message}")]
    ParseFailure {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl ManifestError {
    /// Creates a new UnsupportedFileKind error
    pub fn unsupported(path: impl Into<PathBuf>) -> Self {
        ManifestError::UnsupportedFileKind { path: path.into() }
    }

    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new ParseFailure error
    pub fn parse_failure(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        ManifestError::ParseFailure {
            path: path.into(),
            line,
            message: message.into(),
        }
    }

    /// Line hint carried by the error, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ManifestError::ParseFailure { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Coarse classification of remote failures, used by consumers to pick a remediation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteErrorKind {
    /// Credential missing, invalid or lacking permission (401/403)
    Auth,
    /// Too many requests (429)
    RateLimit,
    /// Timeout, DNS failure, refused or unreachable connection
    Network,
    /// The service failed (5xx)
    Server,
    /// Anything else
    Unknown,
}

impl RemoteErrorKind {
    /// Returns the wire/display name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteErrorKind::Auth => "auth",
            RemoteErrorKind::RateLimit => "rate-limit",
            RemoteErrorKind::Network => "network",
            RemoteErrorKind::Server => "server",
            RemoteErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors related to the remote analysis service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// Authentication failed (401/403)
    #[error("authentication failed (HTTP {status}): check the configured API token")]
    Auth { status: u16 },

    /// Rate limit exceeded (429)
    #[error("rate limit exceeded: try again later")]
    RateLimited,

    /// DNS, refused or unreachable connection
    #[error("unable to reach the analysis service: {message}")]
    Network { message: String },

    /// The request exceeded its time budget
    #[error("request to the analysis service timed out")]
    Timeout,

    /// The service failed (5xx)
    #[error("analysis service error (HTTP {status})")]
    Server { status: u16 },

    /// Any other 4xx response
    #[error("analysis request rejected (HTTP {status}): {message}")]
    Client { status: u16, message: String },

    /// The body could not be decoded
    #[error("invalid response from the analysis service: {message}")]
    InvalidResponse { message: String },

    /// Anything not covered above
    #[error("analysis failed: {message}")]
    Unknown { message: String },
}

impl RemoteError {
    /// Classifies an HTTP status into the matching error
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => RemoteError::Auth { status },
            429 => RemoteError::RateLimited,
            500.. => RemoteError::Server { status },
            400..=499 => RemoteError::Client {
                status,
                message: body.into(),
            },
            _ => RemoteError::Unknown {
                message: format!("unexpected HTTP {}", status),
            },
        }
    }

    /// Returns the coarse kind of this error
    pub fn kind(&self) -> RemoteErrorKind {
        match self {
            RemoteError::Auth { .. } => RemoteErrorKind::Auth,
            RemoteError::RateLimited => RemoteErrorKind::RateLimit,
            RemoteError::Network { .. } | RemoteError::Timeout => RemoteErrorKind::Network,
            RemoteError::Server { .. } => RemoteErrorKind::Server,
            RemoteError::Client { .. }
            | RemoteError::InvalidResponse { .. }
            | RemoteError::Unknown { .. } => RemoteErrorKind::Unknown,
        }
    }

    /// Client errors (4xx) are final: retrying the same request cannot help
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            RemoteError::Auth { .. } | RemoteError::RateLimited | RemoteError::Client { .. }
        )
    }
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Endpoint is not an http(s) URL with a host
    #[error("invalid endpoint '{value}': {message}")]
    InvalidEndpoint { value: String, message: String },

    /// Exclusion glob could not be compiled
    #[error("invalid exclude pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema
    #[error("failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Directory not found
    #[error("directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Generic IO error
    #[error("IO error at {path}: {source}")]
    Generic {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for application operations
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_classification() {
        assert_eq!(RemoteError::from_status(401, "").kind(), RemoteErrorKind::Auth);
        assert_eq!(RemoteError::from_status(403, "").kind(), RemoteErrorKind::Auth);
        assert_eq!(
            RemoteError::from_status(429, "").kind(),
            RemoteErrorKind::RateLimit
        );
        assert_eq!(
            RemoteError::from_status(500, "").kind(),
            RemoteErrorKind::Server
        );
        assert_eq!(
            RemoteError::from_status(503, "").kind(),
            RemoteErrorKind::Server
        );
        assert_eq!(
            RemoteError::from_status(404, "missing").kind(),
            RemoteErrorKind::Unknown
        );
    }

    #[test]
    fn test_network_and_timeout_are_network_kind() {
        let err = RemoteError::Network {
            message: "dns error".to_string(),
        };
        assert_eq!(err.kind(), RemoteErrorKind::Network);
        assert_eq!(RemoteError::Timeout.kind(), RemoteErrorKind::Network);
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        assert!(!RemoteError::from_status(400, "bad").is_retryable());
        assert!(!RemoteError::from_status(401, "").is_retryable());
        assert!(!RemoteError::from_status(429, "").is_retryable());
        assert!(RemoteError::from_status(502, "").is_retryable());
        assert!(RemoteError::Timeout.is_retryable());
        assert!(RemoteError::Network {
            message: "refused".to_string()
        }
        .is_retryable());
    }

    #[test]
    fn test_error_messages() {
        let err = RemoteError::Auth { status: 401 };
        assert!(err.to_string().contains("authentication failed"));

        let err = RemoteError::Server { status: 503 };
        assert!(err.to_string().contains("503"));

        let err = ManifestError::parse_failure("requirements.txt", 3, "bad line");
        assert!(err.to_string().contains("line 3"));
        assert_eq!(err.line(), Some(3));

        let err = ManifestError::unsupported("Cargo.toml");
        assert!(err.to_string().contains("unsupported file kind"));
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_app_error_from_conversions() {
        let err: AppError = ManifestError::unsupported("x").into();
        assert!(matches!(err, AppError::Manifest(_)));

        let err: AppError = RemoteError::RateLimited.into();
        assert!(matches!(err, AppError::Remote(_)));
    }

    #[test]
    fn test_kind_serde() {
        let json = serde_json::to_string(&RemoteErrorKind::RateLimit).unwrap();
        assert_eq!(json, "\"rate-limit\"");
        assert_eq!(RemoteErrorKind::Network.to_string(), "network");
    }
}
