//! The pipeline coordinator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use smol_llm::{
    CodeGenerator, CodeRepairer, EnvCredentials, LlmError, ProviderKind, ProviderRouter,
    RepairOutcome, NO_REPAIR_NEEDED,
};
use smol_runner::{ProcessSupervisor, StatusReport};
use smol_syntax::SyntaxValidator;
use tracing::{info, warn};

use crate::artifact::{GeneratedArtifact, GenerationOutcome, GenerationRecord, GenerationRequest};
use crate::config::SmolConfig;
use crate::error::{CoreError, CoreResult};

/// Holds the provider selection, history and the supervised application.
///
/// Every operation returns text meant for the user. Errors are rendered
/// instead of propagated. Operations take `&mut self`; an agent is driven by
/// one caller at a time.
pub struct Agent {
    provider: ProviderKind,
    generator: CodeGenerator,
    repairer: CodeRepairer,
    supervisor: ProcessSupervisor,
    save_path: PathBuf,
    history: Vec<GenerationRecord>,
    current_code: Option<String>,
}

impl Agent {
    /// Build an agent with HTTP providers and credentials from the environment.
    pub fn from_config(config: &SmolConfig) -> CoreResult<Self> {
        let router = ProviderRouter::from_configs(
            &config.provider_configs(),
            config.request_timeout(),
            Arc::new(EnvCredentials),
        )?;
        Ok(Self::with_router(config, router))
    }

    /// Build an agent around an already populated router.
    pub fn with_router(config: &SmolConfig, router: ProviderRouter) -> Self {
        let router = Arc::new(router);
        let templates = config.templates();
        Self {
            provider: config.default_provider,
            generator: CodeGenerator::new(Arc::clone(&router), templates.clone()),
            repairer: CodeRepairer::new(router, config.repair_provider, templates),
            supervisor: ProcessSupervisor::new(config.supervisor_config()),
            save_path: config.save_path.clone(),
            history: Vec::new(),
            current_code: None,
        }
    }

    /// Provider used by the next `generate` without an override.
    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    /// Code most recently produced by `generate` or `repair`.
    pub fn current_code(&self) -> Option<&str> {
        self.current_code.as_deref()
    }

    pub fn history(&self) -> &[GenerationRecord] {
        &self.history
    }

    pub fn supervisor(&self) -> &ProcessSupervisor {
        &self.supervisor
    }

    /// Generate application source for `prompt`.
    ///
    /// A given provider name becomes the current selection. Returns the
    /// provider's text unchanged, or an error message.
    pub async fn generate(&mut self, prompt: &str, provider: Option<&str>) -> String {
        if let Some(name) = provider {
            match name.parse::<ProviderKind>() {
                Ok(kind) => self.provider = kind,
                Err(e) => return render_llm_error(&e),
            }
        }

        let request = GenerationRequest::new(prompt, self.provider);
        match self.generator.generate(&request.prompt, request.provider).await {
            Ok(text) => {
                let artifact = GeneratedArtifact::inspect(text);
                let outcome = match &artifact.diagnostic {
                    None => GenerationOutcome::Valid {
                        lines: artifact.source_text.lines().count(),
                    },
                    Some(diagnostic) => GenerationOutcome::Invalid {
                        diagnostic: diagnostic.clone(),
                    },
                };
                if !artifact.is_valid {
                    info!("Generated code does not parse; repair is available");
                }
                self.history.push(GenerationRecord::new(&request, outcome));
                self.current_code = Some(artifact.source_text.clone());
                artifact.source_text
            }
            Err(e) => {
                let message = render_llm_error(&e);
                self.history.push(GenerationRecord::new(
                    &request,
                    GenerationOutcome::Failed {
                        error: e.to_string(),
                    },
                ));
                message
            }
        }
    }

    /// Write `code` to `path`, or to the configured save path.
    pub async fn save(&self, code: &str, path: Option<&Path>) -> String {
        match self.save_to(code, path).await {
            Ok(path) => format!("Code saved to {}", path.display()),
            Err(e) => format!("Error saving code: {}", e),
        }
    }

    /// Typed form of [`Agent::save`]. Returns the path written.
    pub async fn save_to(&self, code: &str, path: Option<&Path>) -> CoreResult<PathBuf> {
        let path = path.unwrap_or(&self.save_path);
        if let Err(e) = tokio::fs::write(path, code).await {
            warn!("Saving to {} failed: {}", path.display(), e);
            return Err(e.into());
        }
        info!("Saved {} bytes to {}", code.len(), path.display());
        Ok(path.to_path_buf())
    }

    /// Ask the repair provider to fix syntax errors in `code`.
    ///
    /// Returns the fixed code, [`NO_REPAIR_NEEDED`], or a failure message.
    pub async fn repair(&mut self, code: &str) -> String {
        match self.try_repair(code).await {
            Ok(RepairOutcome::AlreadyValid) => NO_REPAIR_NEEDED.to_string(),
            Ok(RepairOutcome::Repaired(fixed)) => fixed,
            Err(CoreError::Llm(e @ LlmError::RepairFailed(_))) => e.to_string(),
            Err(e) => format!("Error while trying to fix code: {}", e),
        }
    }

    /// Typed form of [`Agent::repair`].
    pub async fn try_repair(&mut self, code: &str) -> CoreResult<RepairOutcome> {
        let outcome = self.repairer.repair(code).await?;
        if let RepairOutcome::Repaired(fixed) = &outcome {
            self.current_code = Some(fixed.clone());
        }
        Ok(outcome)
    }

    /// Launch `code`, replacing any running application.
    pub async fn launch(&mut self, code: &str) -> String {
        match self.try_launch(code).await {
            Ok(StatusReport::Running { address, .. }) => format!(
                "Application launched successfully! View it at {} in your browser.",
                address
            ),
            Ok(report) => report.to_string(),
            Err(e) => e.to_string(),
        }
    }

    /// Typed form of [`Agent::launch`].
    pub async fn try_launch(&mut self, code: &str) -> CoreResult<StatusReport> {
        Ok(self.supervisor.launch(code).await?)
    }

    pub async fn status(&mut self) -> String {
        self.status_report().await.to_string()
    }

    pub async fn status_report(&mut self) -> StatusReport {
        self.supervisor.status().await
    }

    /// Stop the running application, if any.
    pub async fn stop(&mut self) -> String {
        match self.supervisor.terminate().await {
            Ok(Some(StatusReport::Exited { exit_code, .. })) => match exit_code {
                Some(code) => format!("Application stopped. Exit code: {}", code),
                None => "Application stopped.".to_string(),
            },
            Ok(Some(report)) => report.to_string(),
            Ok(None) => StatusReport::NotStarted.to_string(),
            Err(e) => e.to_string(),
        }
    }

    pub fn switch_provider(&mut self, name: &str) -> String {
        match name.parse::<ProviderKind>() {
            Ok(kind) => {
                info!("Provider switched to {}", kind);
                self.provider = kind;
                format!("Model switched to {}", name.trim())
            }
            Err(e) => render_llm_error(&e),
        }
    }

    pub fn validate(&self, code: &str) -> String {
        SyntaxValidator::validate(code).message
    }
}

fn render_llm_error(error: &LlmError) -> String {
    match error {
        LlmError::UnsupportedProvider(_) | LlmError::RepairFailed(_) => error.to_string(),
        other => format!("Error: {}", other),
    }
}
