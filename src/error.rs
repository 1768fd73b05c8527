//! Error types for the voyage assistant

use thiserror::Error;

/// Result type alias for voyage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the voyage assistant
#[derive(Debug, Error)]
pub enum Error {
    /// The completion provider failed or returned something unusable
    #[error("Completion provider error: {message}")]
    Provider {
        /// Human-readable failure description
        message: String,
        /// HTTP status returned by the upstream endpoint, if any
        status: Option<u16>,
    },

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A tool name that is not registered, or not allowed for the calling agent
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Handoff error
    #[error("Handoff error: {0}")]
    Handoff(String),

    /// The tool-calling loop did not settle on an answer
    #[error("Maximum turns exceeded: {0}")]
    MaxTurnsExceeded(u32),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a provider error without an HTTP status
    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider {
            message: msg.into(),
            status: None,
        }
    }

    /// Create a provider error carrying the upstream HTTP status
    pub fn provider_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Provider {
            message: msg.into(),
            status: Some(status),
        }
    }

    /// Create a handoff error
    pub fn handoff(msg: impl Into<String>) -> Self {
        Self::Handoff(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether retrying the same request could succeed.
    ///
    /// Transport failures, rate limiting and 5xx responses are transient;
    /// everything else (bad requests, schema problems, unknown tools) is not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::Provider {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Whether the failure came from the completion capability
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider { .. } | Self::Http(_) | Self::MaxTurnsExceeded(_)
        )
    }
}
