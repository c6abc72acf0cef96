//! Provider kinds, configuration and the backend trait.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, LlmResult};

/// Supported text-generation services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions.
    OpenAi,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::Gemini];

    /// Short name used in configuration and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Gemini => "gemini-1.5-pro",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    /// Environment variables holding the API key, in lookup order.
    pub fn credential_vars(&self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["OPENAI_API_KEY"],
            Self::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "OpenAI"),
            Self::Gemini => write!(f, "Gemini"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> LlmResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "gpt-4o" | "gpt" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(LlmError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Static per-provider settings, read at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub model: String,
    pub base_url: String,
    /// Environment variables consulted for the API key, in order.
    pub credential_vars: Vec<String>,
}

impl ProviderConfig {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            model: kind.default_model().to_string(),
            base_url: kind.default_base_url().to_string(),
            credential_vars: kind
                .credential_vars()
                .iter()
                .map(|v| v.to_string())
                .collect(),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn credential_var(mut self, var: impl Into<String>) -> Self {
        self.credential_vars = vec![var.into()];
        self
    }
}

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: None,
            user: user.into(),
            temperature,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// A text-generation backend.
///
/// Backends never read credentials themselves; the router resolves the key
/// and hands it over, so a missing key never reaches the network layer.
#[async_trait]
pub trait CodeProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Send one request and return the generated text unmodified.
    async fn complete(&self, request: &CompletionRequest, api_key: &str) -> LlmResult<String>;
}
