use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("INVALID_DATE: {0}")]
    InvalidDate(String),
    #[error("PARSE_FAILURE: {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("WRITE_FAILURE: {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("SERIALIZE: {0}")]
    Serialize(String),
    #[error("CONFIG: {0}")]
    Config(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl JournalError {
    /// Wrap any failure hit while persisting `path` as a write failure.
    pub fn write(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for JournalError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_yaml::Error> for JournalError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Serialize(value.to_string())
    }
}

impl From<tokio::task::JoinError> for JournalError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type JournalResult<T> = Result<T, JournalError>;
