//! Error types for PatentsView fetching.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! [`ClientError`] describes a single HTTP attempt, [`FetchError`] is what callers see.

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("Error {status}, reason: {reason}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
        /// Response body, possibly empty
        body: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Every permitted attempt for a page failed.
    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Attempts made, including the first
        attempts: u32,
        /// Failure of the final attempt
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// Create a status error.
    #[must_use]
    pub fn status(status: u16, reason: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Status { status, reason: reason.into(), body: body.into() }
    }

    /// Returns true if this error is retryable.
    ///
    /// Any transport failure or non-success status qualifies. A body that
    /// arrived with a success status but does not parse will not get better.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }

    /// HTTP status of the failure, if the server answered.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            Self::RetriesExhausted { last, .. } => last.status_code(),
            Self::Parse(_) => None,
        }
    }
}

/// Errors surfaced by a fetch.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// Input validation failed
    #[error("Validation error for '{field}': {message}")]
    Validation {
        /// Input that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Request to the API failed and was not (or no longer) retried
    #[error("Request error: {0}")]
    Request(#[from] ClientError),

    /// HTTP client could not be built from the configuration
    #[error("Client setup failed: {0:#}")]
    Setup(anyhow::Error),

    /// Could not start the runtime for a blocking fetch
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FetchError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// True for bad input shape or range.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// True for network or API failures.
    #[must_use]
    pub const fn is_request(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retryable() {
        assert!(ClientError::status(503, "Service Unavailable", "").is_retryable());
        assert!(ClientError::status(400, "Bad Request", "bad q").is_retryable());

        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!ClientError::from(parse).is_retryable());

        let exhausted = ClientError::RetriesExhausted {
            attempts: 3,
            last: Box::new(ClientError::status(500, "Internal Server Error", "")),
        };
        assert!(!exhausted.is_retryable());
    }

    #[test]
    fn test_status_code_through_exhaustion() {
        let exhausted = ClientError::RetriesExhausted {
            attempts: 2,
            last: Box::new(ClientError::status(502, "Bad Gateway", "")),
        };
        assert_eq!(exhausted.status_code(), Some(502));
        assert!(exhausted.to_string().contains("2 attempts"));
    }

    #[test]
    fn test_fetch_error_kinds() {
        let err = FetchError::validation("fields", "cannot be empty");
        assert!(err.is_validation());
        assert!(!err.is_request());
        assert!(err.to_string().contains("fields"));

        let err = FetchError::from(ClientError::status(404, "Not Found", ""));
        assert!(err.is_request());
        assert!(err.to_string().contains("404"));
    }
}
