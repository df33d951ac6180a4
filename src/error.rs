//! Error handling types for the editor service layer
//!
//! `ServiceError` covers failures raised synchronously to the caller
//! (configuration, dispatch, transport scripting). `ServiceFailure` is the
//! simulated outcome of a round trip and is delivered to deferred results
//! and error listeners instead of being returned.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced synchronously by configuration, dispatch and the test harness
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The requested service was disabled by configuration or is unknown
    #[error("Service '{service}' is not available.")]
    ServiceNotAvailable { service: String },

    /// Options failed validation during configuration
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// `respond`/`http_error` was called while no request was waiting
    #[error("No pending request to settle")]
    NoPendingRequest,

    /// An options file could not be parsed
    #[error("Invalid options file {}: {message}", path.display())]
    OptionsFile { path: PathBuf, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// Create a service-not-available error
    pub fn not_available(service: impl Into<String>) -> Self {
        ServiceError::ServiceNotAvailable {
            service: service.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        ServiceError::Config {
            message: message.into(),
        }
    }

    /// Create an options file error
    pub fn options_file(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ServiceError::OptionsFile {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Simulated outcome of a failed service round trip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceFailure {
    /// The transport reported an HTTP-level failure
    #[error("HTTP error: {error_thrown}")]
    Http {
        error_thrown: String,
        status: Option<u16>,
        response_text: Option<String>,
    },

    /// The server answered with a conflict marker (e.g. `invalidStateId`)
    #[error("Conflict: {kind}")]
    Conflict { kind: String },

    /// The server answered with a payload the service cannot use
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Content assist was requested past the end of the document
    #[error("Offset {offset} is outside of the document (length {length})")]
    OffsetOutOfBounds { offset: usize, length: usize },
}

impl ServiceFailure {
    /// Severity reported to error listeners.
    pub fn severity(&self) -> &'static str {
        match self {
            ServiceFailure::Conflict { .. } => "warning",
            _ => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_available_message_names_the_service() {
        let error = ServiceError::not_available("validation");
        assert_eq!(error.to_string(), "Service 'validation' is not available.");
    }

    #[test]
    fn options_file_message_includes_path() {
        let error = ServiceError::options_file("/tmp/options.toml", "expected a table");
        assert_eq!(
            error.to_string(),
            "Invalid options file /tmp/options.toml: expected a table"
        );
    }

    #[test]
    fn conflict_is_reported_as_warning() {
        let conflict = ServiceFailure::Conflict {
            kind: "invalidStateId".to_string(),
        };
        let http = ServiceFailure::Http {
            error_thrown: "Not Found".to_string(),
            status: Some(404),
            response_text: None,
        };

        assert_eq!(conflict.severity(), "warning");
        assert_eq!(http.severity(), "error");
    }
}
