//! Worker error types.

use thiserror::Error;

use hushcut_media::MediaError;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// True when the failure is the caller's input rather than a
    /// processing breakdown. The API layer maps this split onto
    /// client-error vs server-error responses.
    pub fn is_client_error(&self) -> bool {
        match self {
            WorkerError::Media(e) => e.is_bad_input(),
            _ => false,
        }
    }
}
