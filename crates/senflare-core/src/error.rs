use thiserror::Error;

/// Result type alias for senflare operations
pub type Result<T> = std::result::Result<T, SenflareError>;

/// Errors that can occur anywhere in the endpoint pipeline
#[derive(Error, Debug)]
pub enum SenflareError {
    /// A remote service answered with a non-success status
    #[error("API error ({code}): {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Access to a candidate source was refused (HTTP 403)
    #[error("access restricted: {0}")]
    Forbidden(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Request timed out
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Connection failed
    #[error("connection failed: {0}")]
    Connection(String),

    /// JSON parsing/serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid IPv4 endpoint
    #[error("invalid IPv4 endpoint: {0}")]
    InvalidIp(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Region cache could not be read or written
    #[error("region cache error: {0}")]
    Cache(String),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SenflareError {
    /// Returns true if the error is worth retrying on a later run
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_) | Self::Http(_))
    }

    /// Returns the HTTP status code if this is a status error
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Forbidden(_) => Some(403),
            Self::Api { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_code() {
        assert_eq!(SenflareError::Forbidden("x".into()).status_code(), Some(403));
        let err = SenflareError::Api {
            code: 502,
            message: "bad gateway".into(),
        };
        assert_eq!(err.status_code(), Some(502));
        assert_eq!(SenflareError::Timeout(5).status_code(), None);
    }

    #[test]
    fn test_retryable() {
        assert!(SenflareError::Timeout(8).is_retryable());
        assert!(!SenflareError::InvalidIp("1.2.3".into()).is_retryable());
    }
}
