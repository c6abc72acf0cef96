//! Provider registry and credential resolution.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::error::{LlmError, LlmResult};
use crate::gemini::GeminiProvider;
use crate::openai::OpenAiProvider;
use crate::provider::{CodeProvider, CompletionRequest, ProviderConfig, ProviderKind};

/// Source of API keys.
pub trait CredentialSource: Send + Sync {
    /// Look up a variable. Empty values count as absent.
    fn get(&self, var: &str) -> Option<String>;
}

/// Reads credentials from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn get(&self, var: &str) -> Option<String> {
        std::env::var(var).ok().filter(|v| !v.is_empty())
    }
}

/// Fixed credentials, mostly for tests.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentials {
    values: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(var.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn get(&self, var: &str) -> Option<String> {
        self.values.get(var).filter(|v| !v.is_empty()).cloned()
    }
}

struct ProviderEntry {
    config: ProviderConfig,
    backend: Arc<dyn CodeProvider>,
}

/// Dispatches completion requests to registered providers.
pub struct ProviderRouter {
    entries: HashMap<ProviderKind, ProviderEntry>,
    credentials: Arc<dyn CredentialSource>,
}

impl ProviderRouter {
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            entries: HashMap::new(),
            credentials,
        }
    }

    /// Build a router with the HTTP backend for every given config.
    pub fn from_configs(
        configs: &[ProviderConfig],
        timeout: Option<Duration>,
        credentials: Arc<dyn CredentialSource>,
    ) -> LlmResult<Self> {
        let mut router = Self::new(credentials);
        for config in configs {
            let backend: Arc<dyn CodeProvider> = match config.kind {
                ProviderKind::OpenAi => Arc::new(OpenAiProvider::new(config, timeout)?),
                ProviderKind::Gemini => Arc::new(GeminiProvider::new(config, timeout)?),
            };
            router = router.register(config.clone(), backend);
        }
        Ok(router)
    }

    /// Register (or replace) the backend for `config.kind`.
    pub fn register(mut self, config: ProviderConfig, backend: Arc<dyn CodeProvider>) -> Self {
        debug!("Registered provider {} (model {})", config.kind, config.model);
        self.entries.insert(config.kind, ProviderEntry { config, backend });
        self
    }

    pub fn is_registered(&self, kind: ProviderKind) -> bool {
        self.entries.contains_key(&kind)
    }

    pub fn config(&self, kind: ProviderKind) -> Option<&ProviderConfig> {
        self.entries.get(&kind).map(|e| &e.config)
    }

    /// Resolve the API key for a provider without contacting it.
    pub fn credential(&self, kind: ProviderKind) -> LlmResult<String> {
        let entry = self.entry(kind)?;
        entry
            .config
            .credential_vars
            .iter()
            .find_map(|var| self.credentials.get(var))
            .ok_or_else(|| LlmError::CredentialMissing {
                provider: kind,
                env_var: entry.config.credential_vars.join(" or "),
            })
    }

    /// Send a request to `kind`. The credential is checked before the backend
    /// is touched.
    pub async fn complete(&self, kind: ProviderKind, request: &CompletionRequest) -> LlmResult<String> {
        let entry = self.entry(kind)?;
        let api_key = self.credential(kind)?;

        info!("Requesting completion from {} ({})", kind, entry.config.model);
        entry.backend.complete(request, &api_key).await
    }

    fn entry(&self, kind: ProviderKind) -> LlmResult<&ProviderEntry> {
        self.entries
            .get(&kind)
            .ok_or_else(|| LlmError::UnsupportedProvider(kind.name().to_string()))
    }
}
