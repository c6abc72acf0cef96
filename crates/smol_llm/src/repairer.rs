//! Single-shot syntax repair.

use std::sync::Arc;

use smol_syntax::SyntaxValidator;
use tracing::{info, warn};

use crate::error::{LlmError, LlmResult};
use crate::prompts::PromptTemplates;
use crate::provider::ProviderKind;
use crate::router::ProviderRouter;

/// Message shown when no repair was necessary.
pub const NO_REPAIR_NEEDED: &str = "Code already has valid syntax. No fixes needed.";

/// Result of a repair request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// Input already parsed; no model call was made.
    AlreadyValid,
    /// Provider output that passed validation.
    Repaired(String),
}

/// Asks a fixed provider to fix syntax errors, then re-validates.
pub struct CodeRepairer {
    router: Arc<ProviderRouter>,
    provider: ProviderKind,
    templates: PromptTemplates,
}

impl CodeRepairer {
    pub fn new(router: Arc<ProviderRouter>, provider: ProviderKind, templates: PromptTemplates) -> Self {
        Self {
            router,
            provider,
            templates,
        }
    }

    /// Attempt one repair. Makes at most one provider call.
    pub async fn repair(&self, code: &str) -> LlmResult<RepairOutcome> {
        let check = SyntaxValidator::validate(code);
        if check.valid {
            info!("Repair skipped: code already valid");
            return Ok(RepairOutcome::AlreadyValid);
        }

        info!("Requesting syntax repair from {}", self.provider);
        let request = self.templates.repair(code, &check.message);
        let fixed = self.router.complete(self.provider, &request).await?;

        let recheck = SyntaxValidator::validate(&fixed);
        if recheck.valid {
            Ok(RepairOutcome::Repaired(fixed))
        } else {
            warn!("Repaired code is still invalid: {}", recheck.message);
            Err(LlmError::RepairFailed(recheck.message))
        }
    }
}
