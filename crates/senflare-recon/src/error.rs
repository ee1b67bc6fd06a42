use thiserror::Error;

/// Result type alias for region cache operations
pub type ReconResult<T> = std::result::Result<T, ReconError>;

/// Errors from the region cache
#[derive(Error, Debug)]
pub enum ReconError {
    /// Region cache could not be read or written
    #[error("cache error: {0}")]
    Cache(String),

    /// Filesystem or network I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache file is not valid JSON
    #[error("cache format error: {0}")]
    Format(#[from] serde_json::Error),
}

impl From<ReconError> for senflare_core::SenflareError {
    fn from(err: ReconError) -> Self {
        match err {
            ReconError::Cache(msg) => Self::Cache(msg),
            ReconError::Io(e) => Self::Io(e),
            ReconError::Format(e) => Self::Cache(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use senflare_core::SenflareError;

    #[test]
    fn test_converts_into_pipeline_error() {
        let err: SenflareError = ReconError::Cache("disk full".into()).into();
        assert!(matches!(err, SenflareError::Cache(msg) if msg == "disk full"));

        let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err: SenflareError = ReconError::from(io).into();
        assert!(matches!(err, SenflareError::Io(_)));
    }
}
