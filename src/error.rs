//! Error types for pageloader
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for pageloader
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Unsupported layout: {layout}")]
    UnsupportedLayout { layout: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("Fetch failed: {message}")]
    Fetch { message: String },

    #[error("Load cycle cancelled")]
    Cancelled,

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported layout error
    pub fn unsupported_layout(layout: impl Into<String>) -> Self {
        Self::UnsupportedLayout {
            layout: layout.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(message: impl Into<String>) -> Self {
        Self::Fetch {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Setup-time errors that must abort construction or attachment
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::InvalidConfigValue { .. }
                | Error::UnsupportedLayout { .. }
                | Error::YamlParse(_)
        )
    }

    /// Cancellation is a normal control-flow outcome, not a failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

/// Result type alias for pageloader
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("unknown strategy kind 'cursor'");
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown strategy kind 'cursor'"
        );

        let err = Error::unsupported_layout("staggered");
        assert_eq!(err.to_string(), "Unsupported layout: staggered");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::fetch("connection reset");
        assert_eq!(err.to_string(), "Fetch failed: connection reset");
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::config("x").is_configuration());
        assert!(Error::unsupported_layout("x").is_configuration());
        assert!(Error::invalid_value("page_limit", "must be positive").is_configuration());
        assert!(!Error::fetch("x").is_configuration());

        assert!(Error::Cancelled.is_cancellation());
        assert!(!Error::fetch("x").is_cancellation());
    }

    #[test]
    fn test_result_context_wraps_foreign_errors() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed"));
        let err = result
            .with_context(|| format!("Failed to write item {}", 3))
            .unwrap_err();
        assert!(matches!(err, Error::Other(ref m) if m == "Failed to write item 3: IO error: pipe closed"));
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::fetch("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Fetch failed: inner"));
    }
}
