use thiserror::Error;

/// Failure talking to one of the external collaborators.
///
/// Only [`SourceError::Unreachable`] means the service could not be contacted
/// at all; every other variant is scoped to the single request that produced it.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{service} unreachable: {message}")]
    Unreachable { service: &'static str, message: String },

    #[error("{service} request timed out")]
    Timeout { service: &'static str },

    #[error("{service} returned HTTP {status}: {message}")]
    Status {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("{service}: no row matched {what}")]
    NotFound { service: &'static str, what: String },

    #[error("Failed to decode {service} response: {message}")]
    Decode { service: &'static str, message: String },

    #[error("Invalid request: {0}")]
    InvalidInput(String),
}

impl SourceError {
    pub fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout { service }
        } else if err.is_decode() {
            SourceError::Decode {
                service,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            SourceError::Status {
                service,
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            SourceError::Unreachable {
                service,
                message: err.to_string(),
            }
        }
    }

    /// True when the service could not be contacted at all
    pub fn is_unreachable(&self) -> bool {
        matches!(self, SourceError::Unreachable { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound { .. })
            || matches!(self, SourceError::Status { status: 404, .. })
    }
}
