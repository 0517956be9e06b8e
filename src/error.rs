//! Netguard error types.
//!
//! Errors fall into two groups:
//!
//! - **Caller errors**: the request itself is unusable (missing payload,
//!   malformed body, unknown alert id). These are rejected before any work
//!   is done and map to 4xx responses.
//! - **Setup / internal errors**: a signature file, config file or traffic
//!   sample could not be loaded, or something unexpected failed. These map to
//!   5xx responses or abort startup.
//!
//! A scan never returns a partially populated result: it either produces a
//! complete [`ScanResult`](crate::security::ScanResult) or an error.

use thiserror::Error;

/// Netguard errors.
#[derive(Error, Debug)]
pub enum NetguardError {
    /// Request input is missing or malformed.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Signature registry could not be built.
    #[error("Registry error: {0}")]
    Registry(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Traffic sample could not be loaded.
    #[error("Traffic error: {0}")]
    Traffic(String),

    /// No alert exists with the given id.
    #[error("Alert not found: {0}")]
    AlertNotFound(String),

    /// Unexpected internal failure.
    #[error("Internal error: {0}")]
    Internal(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NetguardError {
    /// Whether the error was caused by the caller rather than the server.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            NetguardError::InvalidInput(_) | NetguardError::AlertNotFound(_)
        )
    }
}

/// Result type alias for Netguard operations
pub type Result<T> = std::result::Result<T, NetguardError>;

impl From<toml::de::Error> for NetguardError {
    fn from(err: toml::de::Error) -> Self {
        NetguardError::Config(err.to_string())
    }
}

impl From<aho_corasick::BuildError> for NetguardError {
    fn from(err: aho_corasick::BuildError) -> Self {
        NetguardError::Registry(format!("Failed to build matcher: {err}"))
    }
}
