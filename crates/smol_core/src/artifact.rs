//! Values passed along the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smol_llm::ProviderKind;
use smol_syntax::SyntaxValidator;
use uuid::Uuid;

/// A single user request for generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub provider: ProviderKind,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            prompt: prompt.into(),
            provider,
        }
    }
}

/// Source text together with its syntax verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedArtifact {
    pub source_text: String,
    pub is_valid: bool,
    /// Parser diagnostic when the text is invalid
    pub diagnostic: Option<String>,
}

impl GeneratedArtifact {
    /// Validate `source_text` and capture the result.
    pub fn inspect(source_text: impl Into<String>) -> Self {
        let source_text = source_text.into();
        let check = SyntaxValidator::validate(&source_text);
        Self {
            is_valid: check.valid,
            diagnostic: (!check.valid).then_some(check.message),
            source_text,
        }
    }
}

/// How a generation request ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// Text came back and parses
    Valid { lines: usize },
    /// Text came back but does not parse
    Invalid { diagnostic: String },
    /// No text came back
    Failed { error: String },
}

/// In-memory history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub id: Uuid,
    pub provider: ProviderKind,
    pub prompt: String,
    pub outcome: GenerationOutcome,
    pub created_at: DateTime<Utc>,
}

impl GenerationRecord {
    pub fn new(request: &GenerationRequest, outcome: GenerationOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            provider: request.provider,
            prompt: request.prompt.clone(),
            outcome,
            created_at: Utc::now(),
        }
    }

    /// One-line summary for listings.
    pub fn summary(&self) -> String {
        let outcome = match &self.outcome {
            GenerationOutcome::Valid { lines } => format!("{} lines, valid", lines),
            GenerationOutcome::Invalid { diagnostic } => format!("invalid ({})", diagnostic),
            GenerationOutcome::Failed { error } => format!("failed ({})", error),
        };
        format!(
            "{} [{}] {}: {}",
            self.created_at.format("%H:%M:%S"),
            self.provider,
            truncate(&self.prompt, 48),
            outcome
        )
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inspect_valid() {
        let artifact = GeneratedArtifact::inspect("print('hi')\n");
        assert!(artifact.is_valid);
        assert!(artifact.diagnostic.is_none());
    }

    #[test]
    fn test_inspect_invalid() {
        let artifact = GeneratedArtifact::inspect("print('hi'\n");
        assert!(!artifact.is_valid);
        assert!(artifact.diagnostic.unwrap().starts_with("Syntax error:"));
    }

    #[test]
    fn test_record_summary() {
        let request = GenerationRequest::new("a counter app with increment button", ProviderKind::Gemini);
        let record = GenerationRecord::new(&request, GenerationOutcome::Valid { lines: 12 });
        let summary = record.summary();
        assert!(summary.contains("[Gemini]"));
        assert!(summary.ends_with("a counter app with increment button: 12 lines, valid"));
    }

    #[test]
    fn test_truncate_long_prompt() {
        let long = "x".repeat(60);
        assert_eq!(truncate(&long, 48), format!("{}...", "x".repeat(48)));
        assert_eq!(truncate("short", 48), "short");
    }
}
