//! Error types and handling for framebridge

/// Result type alias for framebridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Error types for the staging subsystem
///
/// Most lookup-style operations in this crate report unknown identifiers and
/// bounds violations through `false`/`None` return values rather than errors;
/// these variants cover the hard-failure paths only.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// I/O related errors (region file creation, flush, unlink)
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Invalid parameters or configuration
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Platform-specific errors (signal handler installation)
    #[error("Platform error: {message}")]
    Platform { message: String },
}

impl BridgeError {
    /// Create an I/O error from a standard I/O error
    pub fn from_io(source: std::io::Error, context: &str) -> Self {
        Self::Io {
            message: format!("{}: {}", context, source),
            source: Some(source),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, message: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a platform error
    pub fn platform(message: impl Into<String>) -> Self {
        Self::Platform {
            message: message.into(),
        }
    }
}
