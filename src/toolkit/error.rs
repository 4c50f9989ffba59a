// SPDX-License-Identifier: MIT

//! Typed error handling for keyminer-rs
//!
//! Per-request failures are rendered into text results by the tools, so this
//! type only travels along internal fallible paths (argument decoding,
//! configuration, transport startup).

use thiserror::Error;

/// Top-level error type for keyminer-rs
#[derive(Debug, Error)]
pub enum MinerError {
    /// Tool arguments did not match the tool's input shape
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Tool not found in the registry
    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    /// Configuration errors (bad base URL, invalid port)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A transport name with no registered start function
    #[error("Unknown transport mechanism: {0}")]
    UnknownTransport(String),

    /// URL parsing errors
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// HTTP client construction errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl MinerError {
    /// Create an invalid-arguments error
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments(message.into())
    }

    /// Create a tool not found error
    pub fn tool_not_found(name: impl Into<String>) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, MinerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            MinerError::invalid_arguments("missing field `keyword`").to_string(),
            "Invalid arguments: missing field `keyword`"
        );
        assert_eq!(
            MinerError::tool_not_found("nope").to_string(),
            "Tool 'nope' not found"
        );
        assert_eq!(
            MinerError::UnknownTransport("carrier-pigeon".into()).to_string(),
            "Unknown transport mechanism: carrier-pigeon"
        );
    }

    #[test]
    fn test_url_error_converts() {
        let err: MinerError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, MinerError::Url(_)));
    }
}
