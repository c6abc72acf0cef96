//! Prompt-to-source generation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::LlmResult;
use crate::prompts::PromptTemplates;
use crate::provider::ProviderKind;
use crate::router::ProviderRouter;

/// Turns a natural-language prompt into application source.
///
/// The returned text is exactly what the provider produced. No syntax
/// checking happens here.
pub struct CodeGenerator {
    router: Arc<ProviderRouter>,
    templates: PromptTemplates,
}

impl CodeGenerator {
    pub fn new(router: Arc<ProviderRouter>, templates: PromptTemplates) -> Self {
        Self { router, templates }
    }

    pub async fn generate(&self, prompt: &str, provider: ProviderKind) -> LlmResult<String> {
        info!("Generating application with {}", provider);
        let request = self.templates.generation(prompt);

        let result = self.router.complete(provider, &request).await;
        if let Err(e) = &result {
            warn!("Generation failed: {}", e);
        }
        result
    }
}
