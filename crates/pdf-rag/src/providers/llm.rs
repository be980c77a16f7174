//! LLM provider trait for generating answers

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::Result;

/// Incremental answer text
pub type TextStream = BoxStream<'static, Result<String>>;

/// Trait for prompt completion against a single model
///
/// Implementations:
/// - `GeminiLlm`: Google Generative Language API (gemini-2.5-pro, gemini-2.5-flash)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate the full completion for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Start a streaming completion
    ///
    /// Errors opening the stream are returned directly; errors after that
    /// arrive as items of the stream.
    async fn generate_stream(&self, prompt: &str) -> Result<TextStream>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
