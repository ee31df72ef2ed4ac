//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// API request failed
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Rate limit exceeded
    #[error("Rate limit exceeded. Retry after {retry_after:?} seconds")]
    RateLimitError {
        /// Value of the `Retry-After` header, when present
        retry_after: Option<u64>,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Transport error description
        message: String,
    },

    /// Invalid response from API
    #[error("Invalid response: {message}")]
    InvalidResponseError {
        /// What was wrong with the body
        message: String,
    },

    /// Request timeout
    #[error("Request timeout")]
    TimeoutError,

    /// Translation dropped or altered a `{...}` region of the source text
    #[error("Placeholder mismatch: expected {expected:?}, got {found:?}")]
    PlaceholderMismatch {
        /// Brace contents of the source text
        expected: Vec<String>,
        /// Brace contents of the translation
        found: Vec<String>,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        /// Path the operation failed on
        path: String,
        /// Underlying error
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Validation failure
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl TranslationError {
    /// Wrap an IO error with the path it happened on
    pub fn file(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        TranslationError::FileError {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for TranslationError {
    fn from(err: anyhow::Error) -> Self {
        TranslationError::InternalError(err.to_string())
    }
}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslationError::TimeoutError
        } else {
            TranslationError::NetworkError {
                message: err.to_string(),
            }
        }
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_file_error_keeps_path() {
        let err = TranslationError::file(Path::new("dir/a.yml"), "denied");
        assert_eq!(err.to_string(), "File error: dir/a.yml - denied");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: TranslationError = anyhow::anyhow!("boom").into();
        assert!(matches!(err, TranslationError::InternalError(ref m) if m == "boom"));
    }
}
