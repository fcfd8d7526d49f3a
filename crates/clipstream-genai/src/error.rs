//! Generation service error types.

use thiserror::Error;

pub type GenAiResult<T> = Result<T, GenAiError>;

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The service could not be reached at all (connect failure, timeout).
    #[error("Generation service unreachable: {0}")]
    Unreachable(String),

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation service returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The service answered but the payload is unusable.
    #[error("Unusable generation response: {0}")]
    InvalidResponse(String),
}

impl GenAiError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Whether the degraded/offline fallback applies.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, GenAiError::Unreachable(_))
    }
}

impl From<reqwest::Error> for GenAiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            GenAiError::Unreachable(e.to_string())
        } else if e.is_decode() {
            GenAiError::InvalidResponse(e.to_string())
        } else {
            GenAiError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unreachable_is_unreachable() {
        assert!(GenAiError::unreachable("refused").is_unreachable());
        assert!(!GenAiError::invalid_response("bad json").is_unreachable());
        assert!(!GenAiError::Api {
            status: 500,
            body: "boom".into()
        }
        .is_unreachable());
    }
}
