//! LLM Gateway port
//!
//! Defines the single capability agents need from a model provider:
//! turn a [`Prompt`] into raw text.

use async_trait::async_trait;
use nutri_domain::{Model, Prompt};
use thiserror::Error;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Whether a retry with backoff may succeed.
    ///
    /// Auth failures and malformed bodies are permanent; throttling,
    /// server errors, timeouts and dropped connections are not.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::ConnectionError(_)
            | GatewayError::RateLimited(_)
            | GatewayError::Timeout => true,
            GatewayError::Http { status, .. } => *status >= 500,
            GatewayError::AuthenticationFailed(_)
            | GatewayError::ModelNotAvailable(_)
            | GatewayError::MalformedResponse(_)
            | GatewayError::Other(_) => false,
        }
    }
}

/// Gateway for LLM communication
///
/// This port defines how the application layer communicates with LLM providers.
/// Implementations (adapters) live in the infrastructure layer. Text and
/// vision calls share this one method; the [`Prompt`] variant says which
/// calling convention to use.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send one prompt to `model` and return its raw text answer
    async fn generate(&self, model: &Model, prompt: &Prompt) -> Result<String, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(GatewayError::Timeout.is_transient());
        assert!(GatewayError::RateLimited("slow down".into()).is_transient());
        assert!(
            GatewayError::Http {
                status: 503,
                message: "unavailable".into()
            }
            .is_transient()
        );
        assert!(
            !GatewayError::Http {
                status: 400,
                message: "bad request".into()
            }
            .is_transient()
        );
        assert!(!GatewayError::AuthenticationFailed("bad key".into()).is_transient());
    }
}
