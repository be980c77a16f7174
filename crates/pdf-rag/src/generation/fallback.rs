//! Two-model answer generation: primary first, fallback on failure

use futures::stream::{self, StreamExt};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{LlmProvider, TextStream};

/// A completed answer and the model that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub text: String,
    pub model: String,
}

/// Generates answers with a primary model, switching to a fallback model
/// when the primary fails
pub struct AnswerGenerator {
    primary: Arc<dyn LlmProvider>,
    fallback: Arc<dyn LlmProvider>,
}

impl AnswerGenerator {
    pub fn new(primary: Arc<dyn LlmProvider>, fallback: Arc<dyn LlmProvider>) -> Self {
        Self { primary, fallback }
    }

    pub fn primary(&self) -> &Arc<dyn LlmProvider> {
        &self.primary
    }

    pub fn fallback(&self) -> &Arc<dyn LlmProvider> {
        &self.fallback
    }

    /// Generate a full answer
    pub async fn generate(&self, prompt: &str) -> Result<Generated> {
        let primary_err = match self.primary.generate(prompt).await {
            Ok(text) => {
                return Ok(Generated {
                    text,
                    model: self.primary.model().to_string(),
                })
            }
            Err(e) => e,
        };

        tracing::warn!(
            "Primary model {} failed ({}), falling back to {}",
            self.primary.model(),
            primary_err,
            self.fallback.model()
        );

        match self.fallback.generate(prompt).await {
            Ok(text) => Ok(Generated {
                text,
                model: self.fallback.model().to_string(),
            }),
            Err(fallback_err) => Err(self.both_failed(&primary_err, &fallback_err)),
        }
    }

    /// Start a streamed answer
    ///
    /// The fallback takes over only if the primary fails before producing
    /// any text. Failures after the first piece of text are passed through
    /// to the caller.
    pub async fn generate_stream(&self, prompt: &str) -> Result<(TextStream, String)> {
        let primary_err = match Self::open_primed(self.primary.as_ref(), prompt).await {
            Ok(stream) => return Ok((stream, self.primary.model().to_string())),
            Err(e) => e,
        };

        tracing::warn!(
            "Primary model {} failed to stream ({}), falling back to {}",
            self.primary.model(),
            primary_err,
            self.fallback.model()
        );

        match Self::open_primed(self.fallback.as_ref(), prompt).await {
            Ok(stream) => Ok((stream, self.fallback.model().to_string())),
            Err(fallback_err) => Err(self.both_failed(&primary_err, &fallback_err)),
        }
    }

    /// Open a stream and wait for its first piece of text
    async fn open_primed(llm: &dyn LlmProvider, prompt: &str) -> Result<TextStream> {
        let mut inner = llm.generate_stream(prompt).await?;
        match inner.next().await {
            Some(Ok(first)) => Ok(stream::iter(vec![Ok(first)]).chain(inner).boxed()),
            Some(Err(e)) => Err(e),
            None => Err(Error::llm(format!("{} returned an empty stream", llm.model()))),
        }
    }

    fn both_failed(&self, primary_err: &Error, fallback_err: &Error) -> Error {
        Error::llm(format!(
            "primary model {} failed: {}; fallback model {} failed: {}",
            self.primary.model(),
            primary_err,
            self.fallback.model(),
            fallback_err
        ))
    }
}
