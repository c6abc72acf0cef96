//! Mock provider for testing.
//!
//! Provides a configurable implementation of the [`CodeProvider`] trait for
//! use in tests without network access.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{LlmError, LlmResult};
use crate::provider::{CodeProvider, CompletionRequest, ProviderKind};

/// Predefined reply for a completion call.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Failure(String),
}

/// Captured call information for verification.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub kind: ProviderKind,
    pub system: Option<String>,
    pub user: String,
    pub temperature: f32,
    pub api_key: String,
}

/// Mock provider for testing.
///
/// Records every call and returns queued replies in order, cycling when the
/// queue is exhausted. A provider built with [`MockProvider::forbidden`]
/// panics when invoked, failing any test that reaches it.
#[derive(Clone)]
pub struct MockProvider {
    kind: ProviderKind,
    replies: Arc<RwLock<Vec<MockReply>>>,
    reply_index: Arc<AtomicUsize>,
    captured: Arc<RwLock<Vec<CapturedRequest>>>,
    forbidden: bool,
}

impl MockProvider {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            replies: Arc::new(RwLock::new(Vec::new())),
            reply_index: Arc::new(AtomicUsize::new(0)),
            captured: Arc::new(RwLock::new(Vec::new())),
            forbidden: false,
        }
    }

    /// A provider that must never be called.
    pub fn forbidden(kind: ProviderKind) -> Self {
        Self {
            forbidden: true,
            ..Self::new(kind)
        }
    }

    /// Queue a successful reply.
    pub fn reply(self, text: impl Into<String>) -> Self {
        self.replies.write().push(MockReply::Text(text.into()));
        self
    }

    /// Queue a transport failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.replies.write().push(MockReply::Failure(message.into()));
        self
    }

    /// Get all captured calls.
    pub fn calls(&self) -> Vec<CapturedRequest> {
        self.captured.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured.read().len()
    }

    pub fn clear_calls(&self) {
        self.captured.write().clear();
    }

    fn next_reply(&self) -> MockReply {
        let replies = self.replies.read();
        if replies.is_empty() {
            return MockReply::Text(String::new());
        }
        let index = self.reply_index.fetch_add(1, Ordering::SeqCst);
        replies[index % replies.len()].clone()
    }
}

#[async_trait]
impl CodeProvider for MockProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(&self, request: &CompletionRequest, api_key: &str) -> LlmResult<String> {
        if self.forbidden {
            panic!("{} provider was called but must not be", self.kind);
        }

        self.captured.write().push(CapturedRequest {
            kind: self.kind,
            system: request.system.clone(),
            user: request.user.clone(),
            temperature: request.temperature,
            api_key: api_key.to_string(),
        });

        match self.next_reply() {
            MockReply::Text(text) => Ok(text),
            MockReply::Failure(message) => Err(LlmError::ProviderError {
                provider: self.kind,
                message,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replies_in_order() {
        let mock = MockProvider::new(ProviderKind::OpenAi)
            .reply("first")
            .fail("boom");
        let request = CompletionRequest::new("x", 0.2);

        assert_eq!(mock.complete(&request, "k").await.unwrap(), "first");
        assert!(mock.complete(&request, "k").await.is_err());
        assert_eq!(mock.complete(&request, "k").await.unwrap(), "first");
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_captures_request() {
        let mock = MockProvider::new(ProviderKind::Gemini);
        let request = CompletionRequest::new("make an app", 0.1).system("sys");
        let _ = mock.complete(&request, "key-1").await;

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].user, "make an app");
        assert_eq!(calls[0].system.as_deref(), Some("sys"));
        assert_eq!(calls[0].api_key, "key-1");

        mock.clear_calls();
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    #[should_panic(expected = "must not be")]
    async fn test_forbidden_panics() {
        let mock = MockProvider::forbidden(ProviderKind::OpenAi);
        let _ = mock.complete(&CompletionRequest::new("x", 0.2), "k").await;
    }
}
