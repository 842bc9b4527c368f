use std::fmt;

use reqwest::StatusCode;

use crate::domain::error::AppError;

/// Tagged failure of a single remote call. Every variant is recoverable.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteFailure {
    MissingApiKey,
    EmptyResponse,
    NotFound,
    RateLimited,
    Status { code: u16, body: String },
    Timeout,
    Transport(String),
    Malformed(String),
}

impl RemoteFailure {
    /// The request URL is dropped from the message; it may carry credentials.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteFailure::Timeout
        } else {
            RemoteFailure::Transport(err.without_url().to_string())
        }
    }

    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => RemoteFailure::NotFound,
            StatusCode::TOO_MANY_REQUESTS => RemoteFailure::RateLimited,
            other => RemoteFailure::Status {
                code: other.as_u16(),
                body,
            },
        }
    }
}

impl fmt::Display for RemoteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteFailure::MissingApiKey => write!(f, "API key not configured"),
            RemoteFailure::EmptyResponse => write!(f, "Empty response"),
            RemoteFailure::NotFound => write!(f, "Model not available (404)"),
            RemoteFailure::RateLimited => write!(f, "Rate limit exceeded (429)"),
            RemoteFailure::Status { code, body } => write!(f, "API error {}: {}", code, body),
            RemoteFailure::Timeout => write!(f, "Request timed out"),
            RemoteFailure::Transport(msg) => write!(f, "Request failed: {}", msg),
            RemoteFailure::Malformed(msg) => write!(f, "Unexpected response shape: {}", msg),
        }
    }
}

impl From<RemoteFailure> for AppError {
    fn from(failure: RemoteFailure) -> Self {
        AppError::RemoteCallFailed(failure.to_string())
    }
}
