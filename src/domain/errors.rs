//! Domain error types
//!
//! This module defines the error hierarchy for garden-sync.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main garden-sync error type
///
/// This is the primary error type used throughout the application.
/// Public publish/delete/write entry points never return it; they log it
/// and convert it into a boolean or a [`FailureKind`].
#[derive(Debug, Error)]
pub enum GardenError {
    /// Configuration-related errors (missing repository, username or token)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote repository errors
    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    /// Frontmatter or path validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Artifact compilation errors
    #[error("Compile error: {0}")]
    Compile(String),

    /// A suspension point exceeded its deadline
    #[error("Operation timed out after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl GardenError {
    /// Classify this error for per-file batch outcomes
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            GardenError::Configuration(_) => FailureKind::Configuration,
            GardenError::Validation(_) => FailureKind::Validation,
            GardenError::Timeout { .. } => FailureKind::Timeout,
            GardenError::Remote(RemoteError::Conflict(_)) => FailureKind::Conflict,
            GardenError::Remote(_) => FailureKind::Remote,
            GardenError::Compile(_) => FailureKind::Compile,
            GardenError::Io(_) => FailureKind::Io,
            GardenError::Serialization(_) | GardenError::Other(_) => FailureKind::Other,
        }
    }
}

/// Remote repository errors
///
/// Errors that occur when talking to the hosted repository API.
/// These errors don't expose the HTTP client types.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Failed to reach the API
    #[error("Failed to connect to repository API: {0}")]
    ConnectionFailed(String),

    /// Token rejected (401/403)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Path, ref or repository not found where one was required
    #[error("Not found: {0}")]
    NotFound(String),

    /// Hash precondition rejected by the store (409/422 on write)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Response body did not have the expected shape
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

/// Why a single file in a batch did not land
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Configuration,
    Validation,
    Timeout,
    Conflict,
    Remote,
    Compile,
    Io,
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureKind::Configuration => "configuration",
            FailureKind::Validation => "validation",
            FailureKind::Timeout => "timeout",
            FailureKind::Conflict => "conflict",
            FailureKind::Remote => "remote",
            FailureKind::Compile => "compile",
            FailureKind::Io => "io",
            FailureKind::Other => "other",
        };
        f.write_str(name)
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for GardenError {
    fn from(err: std::io::Error) -> Self {
        GardenError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for GardenError {
    fn from(err: serde_json::Error) -> Self {
        GardenError::Serialization(err.to_string())
    }
}

// Frontmatter parse errors
impl From<serde_yaml::Error> for GardenError {
    fn from(err: serde_yaml::Error) -> Self {
        GardenError::Validation(format!("Invalid frontmatter: {err}"))
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for GardenError {
    fn from(err: toml::de::Error) -> Self {
        GardenError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<base64::DecodeError> for GardenError {
    fn from(err: base64::DecodeError) -> Self {
        GardenError::Serialization(format!("Invalid base64 content: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garden_error_display() {
        let err = GardenError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_remote_error_conversion() {
        let remote_err = RemoteError::ConnectionFailed("Network error".to_string());
        let err: GardenError = remote_err.into();
        assert!(matches!(err, GardenError::Remote(_)));
    }

    #[test]
    fn test_timeout_display() {
        let err = GardenError::Timeout {
            operation: "write src/site/notes/a.md".to_string(),
            seconds: 5,
        };
        assert_eq!(
            err.to_string(),
            "Operation timed out after 5s: write src/site/notes/a.md"
        );
    }

    #[test]
    fn test_failure_kind_mapping() {
        assert_eq!(
            GardenError::Configuration("x".into()).failure_kind(),
            FailureKind::Configuration
        );
        assert_eq!(
            GardenError::Timeout {
                operation: "x".into(),
                seconds: 1
            }
            .failure_kind(),
            FailureKind::Timeout
        );
        assert_eq!(
            GardenError::Remote(RemoteError::Conflict("sha mismatch".into())).failure_kind(),
            FailureKind::Conflict
        );
        assert_eq!(
            GardenError::Remote(RemoteError::RateLimited("60s".into())).failure_kind(),
            FailureKind::Remote
        );
        assert_eq!(GardenError::Io("disk".into()).failure_kind(), FailureKind::Io);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: GardenError = io_err.into();
        assert!(matches!(err, GardenError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: GardenError = json_err.into();
        assert!(matches!(err, GardenError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: GardenError = toml_err.into();
        assert!(matches!(err, GardenError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_garden_error_implements_std_error() {
        let err = GardenError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
