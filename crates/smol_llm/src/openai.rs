//! OpenAI chat completions backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LlmError, LlmResult};
use crate::provider::{CodeProvider, CompletionRequest, ProviderConfig, ProviderKind};

/// Calls `POST {base_url}/v1/chat/completions`.
pub struct OpenAiProvider {
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiProvider {
    pub fn new(config: &ProviderConfig, timeout: Option<Duration>) -> LlmResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LlmError::provider(ProviderKind::OpenAi, e.to_string()))?;

        Ok(Self {
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, request: &CompletionRequest) -> OpenAIRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(OpenAIMessage {
            role: "user".to_string(),
            content: request.user.clone(),
        });

        OpenAIRequest {
            model: self.model.clone(),
            messages,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl CodeProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn complete(&self, request: &CompletionRequest, api_key: &str) -> LlmResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request(request);
        debug!("OpenAI request: model={} temperature={}", self.model, request.temperature);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
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

        let result: OpenAIResponse = response.json().await.map_err(|e| {
            LlmError::provider(self.kind(), format!("Failed to parse response: {}", e))
        })?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::provider(self.kind(), "No response from OpenAI"))
    }
}

// OpenAI API types
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}
