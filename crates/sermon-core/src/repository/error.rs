//! Repository error handling
//!
//! Typed errors for the remote sermon collection with user-facing messages.

use thiserror::Error;

/// Errors that can occur talking to the remote collection
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// The collection does not exist yet
    #[error("Collection not found")]
    NotFound,

    /// Credentials were rejected
    #[error("Authentication failed (HTTP {status}). Check the repository API key.")]
    Unauthorized { status: u16 },

    /// No collection or key configured
    #[error("Repository not configured: {0}")]
    NotConfigured(String),

    /// Any other non-success response
    #[error("Repository request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Network failure before a response arrived
    #[error("Repository unreachable: {0}")]
    Transport(String),

    /// Response body could not be decoded
    #[error("Invalid repository response: {0}")]
    InvalidResponse(String),

    /// Operation targeted a sermon that is not in the collection
    #[error("Sermon {0} not found")]
    UnknownSermon(i64),
}

impl RepositoryError {
    /// Classify an HTTP status and body
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            404 => RepositoryError::NotFound,
            401 | 403 => RepositoryError::Unauthorized { status },
            _ => RepositoryError::Status {
                status,
                body: body.into(),
            },
        }
    }

    /// Whether retrying the same request later might succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RepositoryError::Transport(_) => true,
            RepositoryError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Hint shown next to the error banner
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            RepositoryError::Unauthorized { .. } => {
                Some("Set the key with `sermon config set repository.api_key <key>`.")
            }
            RepositoryError::NotConfigured(_) => {
                Some("Set `repository.collection` and `repository.api_key` in the config file.")
            }
            RepositoryError::Transport(_) => Some("Check your network connection and try again."),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::InvalidResponse(err.to_string())
        } else {
            RepositoryError::Transport(err.to_string())
        }
    }
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            RepositoryError::from_status(404, ""),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::from_status(401, ""),
            RepositoryError::Unauthorized { status: 401 }
        ));
        assert!(matches!(
            RepositoryError::from_status(500, "boom"),
            RepositoryError::Status { status: 500, .. }
        ));
    }

    #[test]
    fn test_transient() {
        assert!(RepositoryError::Transport("reset".into()).is_transient());
        assert!(RepositoryError::from_status(503, "").is_transient());
        assert!(!RepositoryError::from_status(400, "").is_transient());
        assert!(!RepositoryError::NotFound.is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = RepositoryError::from_status(403, "");
        assert!(err.to_string().contains("Authentication failed"));
        assert!(err.recovery_suggestion().is_some());

        let err = RepositoryError::from_status(418, "teapot");
        assert!(err.to_string().contains("418"));
        assert!(err.to_string().contains("teapot"));
    }
}
