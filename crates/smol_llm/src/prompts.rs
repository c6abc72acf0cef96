//! Instruction templates for generation and repair.

use crate::provider::CompletionRequest;

/// Sampling temperature for code generation.
pub const GENERATION_TEMPERATURE: f32 = 0.2;

/// Sampling temperature for syntax repair. Lower than generation.
pub const REPAIR_TEMPERATURE: f32 = 0.1;

/// Port the UI library binds to when none is given.
pub const LIBRARY_DEFAULT_PORT: u16 = 7860;

/// Builds the requests sent to providers.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    port: u16,
}

impl PromptTemplates {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Request asking for a complete application implementing `prompt`.
    pub fn generation(&self, prompt: &str) -> CompletionRequest {
        let system = format!(
            "You are a helpful AI assistant that generates Python code for Gradio applications.\n\
             Return ONLY the working Python code without any explanation or markdown formatting.\n\
             Make sure the code has proper imports and uses port {port} instead of the default {default}.\n\
             The code MUST be valid Python syntax that can run without errors.\n\
             Ensure all parentheses, brackets, and quotes are properly closed.",
            port = self.port,
            default = LIBRARY_DEFAULT_PORT,
        );
        let user = format!(
            "Generate a complete, working Gradio application that: {}. \
             The code must use port {} instead of the default port.",
            prompt.trim(),
            self.port
        );

        CompletionRequest::new(user, GENERATION_TEMPERATURE).system(system)
    }

    /// Request asking for `code` with its syntax errors fixed.
    pub fn repair(&self, code: &str, diagnostic: &str) -> CompletionRequest {
        let system = "You are a Python expert. Fix the syntax errors in this code WITHOUT \
                      changing its functionality. Return ONLY the fixed code.";
        let user = format!(
            "This code has syntax errors. Please fix them:\n\n{}\n\nError: {}",
            code, diagnostic
        );

        CompletionRequest::new(user, REPAIR_TEMPERATURE).system(system)
    }
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self::new(7861)
    }
}
