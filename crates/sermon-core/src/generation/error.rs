//! Generation error handling

use thiserror::Error;

/// Errors that can occur while asking the model for content
#[derive(Error, Debug)]
pub enum GenerationError {
    /// No API key configured for the generation service
    #[error("Generation API key is not configured")]
    MissingCredential,

    /// Request never produced a response
    #[error("Generation service unreachable: {0}")]
    Unreachable(String),

    /// Service answered with a non-success status
    #[error("Generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response carried no candidate text (blocked or empty)
    #[error("Generation service returned no content{}", with_reason(.reason))]
    EmptyResponse { reason: Option<String> },

    /// Candidate text held no usable outline
    #[error("Could not read the generated outline: {0}")]
    Parse(String),
}

impl GenerationError {
    /// Whether trying the same request again might succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GenerationError::Unreachable(_) | GenerationError::Parse(_) => true,
            GenerationError::EmptyResponse { .. } => true,
            GenerationError::Status { status, .. } => *status == 429 || *status >= 500,
            GenerationError::MissingCredential => false,
        }
    }

    /// Hint shown next to the error banner
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            GenerationError::MissingCredential => Some(
                "Set SERMON_GENERATION_KEY or run `sermon config set generation.api_key <key>`.",
            ),
            GenerationError::Unreachable(_) => Some("Check your network connection and try again."),
            GenerationError::Parse(_) | GenerationError::EmptyResponse { .. } => {
                Some("The model answered in an unexpected format. Try generating again.")
            }
            GenerationError::Status { status: 401 | 403, .. } => {
                Some("The generation API key was rejected.")
            }
            GenerationError::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            GenerationError::Parse(err.to_string())
        } else {
            GenerationError::Unreachable(err.to_string())
        }
    }
}

fn with_reason(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default()
}

/// Result type for generation calls
pub type GenerationResult<T> = Result<T, GenerationError>;
