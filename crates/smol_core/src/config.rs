//! Configuration loading.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`smol.toml` in the working directory, or an
//!    explicit path)
//! 3. `SMOL_PORT`, `SMOL_INTERPRETER` and `SMOL_PROVIDER` environment variables
//!
//! ```toml
//! port = 7861
//! default_provider = "gemini"
//! interpreter = "python3"
//!
//! [openai]
//! model = "gpt-4o"
//!
//! [gemini]
//! base_url = "http://localhost:8080"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use smol_llm::{PromptTemplates, ProviderConfig, ProviderKind};
use smol_runner::SupervisorConfig;
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};

/// File looked up in the working directory when no path is given.
pub const CONFIG_FILE_NAME: &str = "smol.toml";

/// Per-provider overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub model: Option<String>,
    pub base_url: Option<String>,
}

/// Everything the pipeline needs to run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmolConfig {
    /// Port launched applications are pinned to
    pub port: u16,
    /// Provider used for generation until switched
    pub default_provider: ProviderKind,
    /// Provider used for every repair, regardless of the current selection
    pub repair_provider: ProviderKind,
    /// Running artifact, overwritten on each launch
    pub artifact_path: PathBuf,
    /// Default target of `save`
    pub save_path: PathBuf,
    pub interpreter: String,
    pub interpreter_args: Vec<String>,
    pub grace_period_ms: u64,
    pub terminate_timeout_ms: u64,
    /// HTTP timeout for provider calls; 0 disables it
    pub request_timeout_secs: u64,
    pub openai: ProviderSettings,
    pub gemini: ProviderSettings,
}

impl Default for SmolConfig {
    fn default() -> Self {
        let supervisor = SupervisorConfig::default();
        Self {
            port: supervisor.port,
            default_provider: ProviderKind::OpenAi,
            repair_provider: ProviderKind::OpenAi,
            artifact_path: supervisor.artifact_path,
            save_path: PathBuf::from("generated_app.py"),
            interpreter: supervisor.interpreter,
            interpreter_args: Vec::new(),
            grace_period_ms: supervisor.grace_period.as_millis() as u64,
            terminate_timeout_ms: supervisor.terminate_timeout.as_millis() as u64,
            request_timeout_secs: 120,
            openai: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
        }
    }
}

impl SmolConfig {
    /// Load from `path`, or from `smol.toml` when present, then apply the
    /// process environment.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_file(default_path)?
                } else {
                    debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Self::default()
                }
            }
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `SMOL_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> CoreResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(port) = lookup("SMOL_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| CoreError::Config(format!("SMOL_PORT is not a valid port: {}", port)))?;
        }
        if let Some(interpreter) = lookup("SMOL_INTERPRETER") {
            self.interpreter = interpreter;
        }
        if let Some(provider) = lookup("SMOL_PROVIDER") {
            self.default_provider = provider.trim().parse()?;
        }
        self.validate()
    }

    fn validate(&self) -> CoreResult<()> {
        if self.port == 0 {
            return Err(CoreError::Config("port must be non-zero".into()));
        }
        if self.interpreter.trim().is_empty() {
            return Err(CoreError::Config("interpreter must not be empty".into()));
        }
        if self.artifact_path.as_os_str().is_empty() {
            return Err(CoreError::Config("artifact_path must not be empty".into()));
        }
        Ok(())
    }

    pub fn supervisor_config(&self) -> SupervisorConfig {
        SupervisorConfig::new()
            .port(self.port)
            .artifact_path(self.artifact_path.clone())
            .interpreter(self.interpreter.clone())
            .interpreter_args(self.interpreter_args.clone())
            .grace_period(Duration::from_millis(self.grace_period_ms))
            .terminate_timeout(Duration::from_millis(self.terminate_timeout_ms))
    }

    pub fn provider_configs(&self) -> Vec<ProviderConfig> {
        ProviderKind::ALL
            .iter()
            .map(|&kind| {
                let settings = self.provider_settings(kind);
                let mut config = ProviderConfig::new(kind);
                if let Some(model) = &settings.model {
                    config = config.model(model.clone());
                }
                if let Some(base_url) = &settings.base_url {
                    config = config.base_url(base_url.clone());
                }
                config
            })
            .collect()
    }

    pub fn provider_settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Gemini => &self.gemini,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn templates(&self) -> PromptTemplates {
        PromptTemplates::new(self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SmolConfig::default();
        assert_eq!(config.port, 7861);
        assert_eq!(config.default_provider, ProviderKind::OpenAi);
        assert_eq!(config.repair_provider, ProviderKind::OpenAi);
        assert_eq!(config.save_path, PathBuf::from("generated_app.py"));
        assert_eq!(config.artifact_path, PathBuf::from("temp_generated_app.py"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SmolConfig::from_toml_str(
            r#"
            default_provider = "gemini"
            grace_period_ms = 500

            [gemini]
            model = "gemini-2.0-flash"
            "#,
        )
        .unwrap();

        assert_eq!(config.default_provider, ProviderKind::Gemini);
        assert_eq!(config.port, 7861);
        assert_eq!(config.supervisor_config().grace_period, Duration::from_millis(500));

        let configs = config.provider_configs();
        assert_eq!(configs.len(), 2);
        let gemini = configs.iter().find(|c| c.kind == ProviderKind::Gemini).unwrap();
        assert_eq!(gemini.model, "gemini-2.0-flash");
        let openai = configs.iter().find(|c| c.kind == ProviderKind::OpenAi).unwrap();
        assert_eq!(openai.model, "gpt-4o");
    }

    #[test]
    fn test_invalid_toml() {
        let err = SmolConfig::from_toml_str("port = \"seven\"").unwrap_err();
        assert!(matches!(err, CoreError::TomlParse(_)));

        let err = SmolConfig::from_toml_str("port = 0").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SmolConfig::default();
        config
            .apply_env(env(&[
                ("SMOL_PORT", "9000"),
                ("SMOL_INTERPRETER", "/usr/bin/python3.12"),
                ("SMOL_PROVIDER", "gemini"),
            ]))
            .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.interpreter, "/usr/bin/python3.12");
        assert_eq!(config.default_provider, ProviderKind::Gemini);
        assert_eq!(config.supervisor_config().address(), "http://localhost:9000");
        assert_eq!(config.templates().port(), 9000);
    }

    #[test]
    fn test_bad_env_values() {
        let mut config = SmolConfig::default();
        let err = config.apply_env(env(&[("SMOL_PORT", "http")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));

        let err = config.apply_env(env(&[("SMOL_PROVIDER", "claude")])).unwrap_err();
        assert!(matches!(err, CoreError::Llm(_)));
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let mut config = SmolConfig::default();
        config.apply_env(env(&[("SMOL_PORT", ""), ("SMOL_INTERPRETER", " ")])).unwrap();
        assert_eq!(config.port, 7861);
    }

    #[test]
    fn test_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "port = 7999\nrequest_timeout_secs = 0\n").unwrap();

        let config = SmolConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 7999);
        assert_eq!(config.request_timeout(), None);

        let missing = SmolConfig::from_file(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, CoreError::Config(_)));
    }
}
