/*!
 * Mock provider implementations for testing.
 *
 * This module provides a chat provider that never touches the network and
 * simulates the ways a model can treat a delimiter-packed request:
 * - `MockProvider::echo()` - Returns the user message unchanged (identity model)
 * - `MockProvider::merging()` - Drops every delimiter, collapsing all blocks into one
 * - `MockProvider::dropping_last()` - Loses the final block
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::errors::ProviderError;
use crate::providers::openai::{OpenAIChoice, OpenAIMessage, OpenAIRequest, OpenAIResponse, TokenUsage};
use crate::providers::Provider;
use crate::translation::protocol::Delimiter;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns the user content as is
    Echo,
    /// Removes every delimiter so the response is a single block
    MergeBlocks,
    /// Removes the last delimiter-separated block
    DropLastBlock,
    /// Fails intermittently (every Nth request) with a retryable error
    Intermittent { fail_every: usize },
    /// Always fails with a retryable server error
    Failing,
    /// Always fails with an authentication error
    Unauthorized,
    /// Returns a response without choices
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter, shared between clones
    request_count: Arc<AtomicUsize>,
    /// Last request received, shared between clones
    last_request: Arc<Mutex<Option<OpenAIRequest>>>,
    /// Custom response generator applied to the user content (optional)
    custom_response: Option<fn(&str) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
            custom_response: None,
        }
    }

    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    pub fn merging() -> Self {
        Self::new(MockBehavior::MergeBlocks)
    }

    pub fn dropping_last() -> Self {
        Self::new(MockBehavior::DropLastBlock)
    }

    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    pub fn unauthorized() -> Self {
        Self::new(MockBehavior::Unauthorized)
    }

    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator, used by the `Echo` and `Slow` behaviors
    pub fn with_custom_response(mut self, generator: fn(&str) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of `complete` calls so far, across all clones
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<OpenAIRequest> {
        self.last_request.lock().ok().and_then(|guard| guard.clone())
    }

    fn respond(&self, user_content: &str) -> String {
        match self.custom_response {
            Some(generator) => generator(user_content),
            None => user_content.to_string(),
        }
    }

    fn response_with_text(text: String, prompt_len: usize) -> OpenAIResponse {
        let prompt_tokens = prompt_len.div_ceil(4) as u32;
        let completion_tokens = text.chars().count().div_ceil(4) as u32;
        OpenAIResponse {
            id: Some("mock-completion".to_string()),
            model: Some("mock".to_string()),
            choices: vec![OpenAIChoice {
                message: OpenAIMessage::new("assistant", text),
                finish_reason: Some("stop".to_string()),
            }],
            usage: Some(TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            }),
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = OpenAIRequest;
    type Response = OpenAIResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let user_content = request.user_content().to_string();
        let prompt_len: usize = request.messages.iter().map(|m| m.content.chars().count()).sum();
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request);
        }

        let delimiter = Delimiter::default();
        match self.behavior {
            MockBehavior::Echo => Ok(Self::response_with_text(self.respond(&user_content), prompt_len)),

            MockBehavior::MergeBlocks => {
                let merged = user_content.replace(delimiter.as_str(), " ");
                Ok(Self::response_with_text(merged, prompt_len))
            }

            MockBehavior::DropLastBlock => {
                let text = match user_content.rfind(delimiter.as_str()) {
                    Some(pos) => user_content[..pos].to_string(),
                    None => user_content,
                };
                Ok(Self::response_with_text(text, prompt_len))
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(Self::response_with_text(self.respond(&user_content), prompt_len))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::Unauthorized => Err(ProviderError::AuthenticationError(
                "Simulated invalid API key".to_string(),
            )),

            MockBehavior::Empty => Ok(OpenAIResponse {
                id: None,
                model: None,
                choices: Vec::new(),
                usage: None,
            }),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(delay_ms)).await;
                Ok(Self::response_with_text(self.respond(&user_content), prompt_len))
            }
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default()
    }
}
