use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppError {
    /// The selected sentiment strategy cannot run (e.g. model never fit).
    ClassificationUnavailable(String),
    /// Timeout, rate limit, non-success status or transport failure.
    RemoteCallFailed(String),
    /// Remote output had no parseable JSON or lacked the expected keys.
    MalformedResponse(String),
    /// Nothing analyzable in the input.
    InputEmpty(String),
    Configuration(String),
    ValidationError(String),
    ParseError(String),
    SecurityError(String),
    IoError(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ClassificationUnavailable(msg) => {
                write!(f, "Classification unavailable: {}", msg)
            }
            AppError::RemoteCallFailed(msg) => write!(f, "Remote call failed: {}", msg),
            AppError::MalformedResponse(msg) => write!(f, "Malformed response: {}", msg),
            AppError::InputEmpty(msg) => write!(f, "Input empty: {}", msg),
            AppError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AppError::SecurityError(msg) => write!(f, "Security error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
