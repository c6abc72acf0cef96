//! Error types for provider calls, generation and repair.

use thiserror::Error;

use crate::provider::ProviderKind;

/// Result type alias for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Errors that can occur while talking to a model provider.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("{provider} API key not found. Please set the {env_var} environment variable.")]
    CredentialMissing {
        provider: ProviderKind,
        env_var: String,
    },

    #[error("Unsupported provider: {0}. Please select 'openai' (gpt-4o) or 'gemini'.")]
    UnsupportedProvider(String),

    #[error("{provider} API request failed: {message}")]
    ProviderError {
        provider: ProviderKind,
        message: String,
    },

    #[error("Could not fix code automatically. {0}")]
    RepairFailed(String),
}

impl LlmError {
    pub(crate) fn provider(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider,
            message: message.into(),
        }
    }
}
