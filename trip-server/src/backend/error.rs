//! Backend error types.

use std::fmt;

/// Errors from talking to the trip backend (HTTP or mock files).
#[derive(Debug)]
pub enum BackendError {
    /// HTTP request failed (network error, timeout, etc.)
    Http(reqwest::Error),

    /// JSON deserialization failed
    Json {
        message: String,
        body: Option<String>,
    },

    /// Backend returned an error status code
    ApiError { status: u16, message: String },

    /// The requested trip, city or weather record does not exist
    NotFound(String),

    /// Rate limited by the backend
    RateLimited,

    /// Missing or rejected credentials
    Unauthorized,

    /// Reading or writing mock data failed
    Io(std::io::Error),
}

impl BackendError {
    /// Build a JSON error, keeping at most 500 characters of the body.
    pub(crate) fn json(err: &serde_json::Error, body: &str) -> Self {
        BackendError::Json {
            message: err.to_string(),
            body: Some(body.chars().take(500).collect()),
        }
    }

    /// True for a missing resource rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound(_))
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Http(e) => write!(f, "HTTP error: {e}"),
            BackendError::Json { message, body } => {
                write!(f, "JSON parse error: {message}")?;
                if let Some(body) = body {
                    write!(f, " (body: {body})")?;
                }
                Ok(())
            }
            BackendError::ApiError { status, message } => {
                write!(f, "backend error {status}: {message}")
            }
            BackendError::NotFound(what) => write!(f, "not found: {what}"),
            BackendError::RateLimited => write!(f, "rate limited by backend"),
            BackendError::Unauthorized => write!(f, "unauthorized"),
            BackendError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for BackendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BackendError::Http(e) => Some(e),
            BackendError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        BackendError::Http(err)
    }
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::Io(err)
    }
}
