//! Error types for the lookout system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for lookout operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the lookout system
#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failures: network unreachable, timeout, non-2xx
    /// responses, or a provider payload carrying an unsuccessful status.
    /// The lookup orchestrator treats these as fallback triggers.
    #[error("Transport error ({provider}): {message}")]
    Transport {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// Malformed input or an unexpected payload shape. Never triggers
    /// fallback; surfaces immediately.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Referenced entity does not exist (device index out of range,
    /// missing history month)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Record store persistence errors
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O errors from the filesystem
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error attributed to a provider
    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a record store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl Error {
    /// Whether this failure should make the lookup orchestrator try the
    /// next provider in the chain. Only transport-class failures do;
    /// parse and store faults surface immediately.
    pub fn triggers_fallback(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
