/*!
 * Provider implementations for the translation engine.
 *
 * - OpenAI: chat completions API (also any OpenAI-compatible server)
 * - Mock: scripted responses for tests and offline runs
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all LLM providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably in the translation service.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The request type for this provider
    type Request: Send + Sync;

    /// The response type for this provider
    type Response: Send + Sync;

    /// Complete a request using this provider
    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError>;

    /// Extract text from the provider response
    fn extract_text(response: &Self::Response) -> String;
}

/// Builds a provider once the API key is known
pub type Connector<P> = Box<dyn Fn(&str) -> P + Send + Sync>;

pub mod mock;
pub mod openai;
