//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// Every webhook request that reaches the assistant assembles its context
/// from the ledger and sends a single completion call. No conversation
/// state is kept between calls, and the caller never retries: a fault
/// becomes a degraded reply.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::llm::TokenUsage;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock LLM client for unit tests
    pub struct MockLlmClient {
        responses: Vec<Result<CompletionResponse, String>>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<Result<CompletionResponse, String>>) -> Self {
            Self {
                responses,
                call_count: AtomicUsize::new(0),
            }
        }

        /// A client that answers every call with the same text
        pub fn replying(text: &str) -> Self {
            Self::new(vec![Ok(CompletionResponse {
                content: Some(text.to_string()),
                usage: TokenUsage::default(),
            })])
        }

        /// A client whose every call fails with the given message
        pub fn failing(message: &str) -> Self {
            Self::new(vec![Err(message.to_string())])
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            let idx = idx.min(self.responses.len().saturating_sub(1));
            match self.responses.get(idx) {
                Some(Ok(resp)) => Ok(resp.clone()),
                Some(Err(msg)) => Err(LlmError::InvalidResponse(msg.clone())),
                None => Err(LlmError::InvalidResponse("no mock responses".to_string())),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::llm::Message;

        #[tokio::test]
        async fn test_mock_client_counts_calls() {
            let client = MockLlmClient::replying("pong");

            let req = CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![Message::user("ping")],
                max_tokens: 100,
            };

            let resp = client.complete(req.clone()).await.unwrap();
            assert_eq!(resp.content, Some("pong".to_string()));

            client.complete(req).await.unwrap();
            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_failing() {
            let client = MockLlmClient::failing("model melted");

            let req = CompletionRequest {
                system_prompt: "Test".to_string(),
                messages: vec![],
                max_tokens: 100,
            };

            let err = client.complete(req).await.unwrap_err();
            assert!(err.to_string().contains("model melted"));
        }
    }
}
