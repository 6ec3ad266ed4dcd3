/*!
 * Core translation service implementation.
 *
 * This module contains the `TranslationService`, which submits one packed
 * document to a chat provider with a per-attempt timeout and a bounded,
 * exponentially backed-off retry for transient failures.
 */

use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::app_config::TranslationConfig;
use crate::errors::TranslationError;
use crate::providers::Provider;
use crate::providers::openai::{OpenAIMessage, OpenAIRequest, OpenAIResponse, TokenUsage};

use super::prompts;
use super::protocol::Delimiter;

/// Translation options for customizing the request loop
#[derive(Debug, Clone)]
pub struct TranslationOptions {
    /// Limit for a single attempt
    pub timeout: Duration,

    /// Additional attempts after the first failure
    pub retry_count: u32,

    /// Base backoff, doubled after each failed attempt
    pub retry_backoff: Duration,

    /// Sampling temperature, provider default when unset
    pub temperature: Option<f32>,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            retry_count: 2,
            retry_backoff: Duration::from_millis(1000),
            temperature: None,
        }
    }
}

impl From<&TranslationConfig> for TranslationOptions {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.common.timeout_secs),
            retry_count: config.common.retry_count,
            retry_backoff: Duration::from_millis(config.common.retry_backoff_ms),
            temperature: config.common.temperature,
        }
    }
}

/// Raw model output with request metadata
#[derive(Debug, Clone)]
pub struct TranslationOutput {
    /// Unparsed content of the first choice
    pub text: String,

    /// Token usage reported by the provider
    pub usage: Option<TokenUsage>,

    /// Wall time of the successful attempt
    pub duration: Duration,

    /// Number of attempts made
    pub attempts: u32,

    /// Full response, for verbose output
    pub response: OpenAIResponse,
}

/// Main translation service
#[derive(Debug)]
pub struct TranslationService<P> {
    /// Provider implementation
    provider: P,

    /// Translation options
    pub options: TranslationOptions,
}

impl<P> TranslationService<P>
where
    P: Provider<Request = OpenAIRequest, Response = OpenAIResponse>,
{
    /// Create a new translation service
    pub fn new(provider: P, options: TranslationOptions) -> Self {
        Self { provider, options }
    }

    /// Access the wrapped provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Translate a packed document into `target_language`
    pub async fn translate(
        &self,
        packed: &str,
        target_language: &str,
        model: &str,
        delimiter: &Delimiter,
    ) -> Result<TranslationOutput, TranslationError> {
        let messages = prompts::build_messages(packed, target_language, delimiter);
        self.complete_messages(model, messages).await
    }

    /// Submit prepared messages and return the first choice's content
    pub async fn complete_messages(
        &self,
        model: &str,
        messages: Vec<OpenAIMessage>,
    ) -> Result<TranslationOutput, TranslationError> {
        let mut request = OpenAIRequest::new(model).messages(messages);
        if let Some(temperature) = self.options.temperature {
            request = request.temperature(temperature);
        }

        let max_attempts = self.options.retry_count + 1;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let start_time = Instant::now();

            match self.attempt(request.clone()).await {
                Ok(response) => {
                    let duration = start_time.elapsed();
                    debug!("Response received in {:?} (attempt {})", duration, attempt);

                    if response.choices.is_empty() {
                        return Err(TranslationError::EmptyResponse);
                    }

                    return Ok(TranslationOutput {
                        text: P::extract_text(&response),
                        usage: response.usage,
                        duration,
                        attempts: attempt,
                        response,
                    });
                }
                Err(e) if Self::is_retryable(&e) && attempt < max_attempts => {
                    let backoff = self.options.retry_backoff * 2u32.saturating_pow(attempt - 1);
                    warn!(
                        "Attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, max_attempts, e, backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) if attempt > 1 && Self::is_retryable(&e) => {
                    return Err(TranslationError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn attempt(&self, request: OpenAIRequest) -> Result<OpenAIResponse, TranslationError> {
        match tokio::time::timeout(self.options.timeout, self.provider.complete(request)).await {
            Ok(result) => result.map_err(TranslationError::from),
            Err(_) => Err(TranslationError::Timeout {
                secs: self.options.timeout.as_secs_f64(),
            }),
        }
    }

    fn is_retryable(error: &TranslationError) -> bool {
        match error {
            TranslationError::Provider(e) => e.is_retryable(),
            TranslationError::Timeout { .. } => true,
            TranslationError::EmptyResponse | TranslationError::RetriesExhausted { .. } => false,
        }
    }
}
