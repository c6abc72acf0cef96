//! Google Gemini `generateContent` backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LlmError, LlmResult};
use crate::provider::{CodeProvider, CompletionRequest, ProviderConfig, ProviderKind};

/// Calls `POST {base_url}/v1beta/models/{model}:generateContent`.
pub struct GeminiProvider {
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: &ProviderConfig, timeout: Option<Duration>) -> LlmResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::provider(ProviderKind::Gemini, e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn build_request(&self, request: &CompletionRequest) -> GeminiRequest {
        GeminiRequest {
            system_instruction: request.system.as_ref().map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: text.clone() }],
            }),
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: request.user.clone(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
            },
        }
    }
}

#[async_trait]
impl CodeProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(&self, request: &CompletionRequest, api_key: &str) -> LlmResult<String> {
        let body = self.build_request(request);
        debug!("Gemini request: model={} temperature={}", self.model, request.temperature);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::provider(self.kind(), format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::provider(
                self.kind(),
                format!("HTTP {}: {}", status, body),
            ));
        }

        let result: GeminiResponse = response.json().await.map_err(|e| {
            LlmError::provider(self.kind(), format!("Failed to parse response: {}", e))
        })?;

        result.into_text().map_err(|msg| LlmError::provider(self.kind(), msg))
    }
}

// Gemini API types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenate the text parts of the first candidate.
    fn into_text(self) -> Result<String, String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(format!("Prompt blocked: {}", reason));
        }

        let content = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| "No response from Gemini".to_string())?;

        Ok(content
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join(""))
    }
}
