//! Question answering over one uploaded document

use crate::error::Result;
use crate::providers::TextStream;
use crate::retrieval::{retrieved_pages, Retriever};
use crate::types::{ChatResponse, ValidChatRequest};

use super::citation::extract_page_citations;
use super::fallback::AnswerGenerator;
use super::prompt::PromptBuilder;

/// Prompt and page set for a question, ready for generation
#[derive(Debug, Clone)]
pub struct PreparedPrompt {
    pub prompt: String,
    /// Pages present in the retrieved context
    pub pages: Vec<u32>,
}

/// A streamed answer and the pages its citations may refer to
pub struct AnswerStream {
    pub text: TextStream,
    pub pages: Vec<u32>,
    pub model: String,
}

impl AnswerStream {
    /// Extract citations once the full answer text is known
    pub fn citations(&self, answer: &str) -> Vec<u32> {
        extract_page_citations(answer, Some(&self.pages))
    }
}

/// Retrieve, prompt, generate, cite
pub struct ChatPipeline {
    retriever: Retriever,
    generator: AnswerGenerator,
}

impl ChatPipeline {
    pub fn new(retriever: Retriever, generator: AnswerGenerator) -> Self {
        Self {
            retriever,
            generator,
        }
    }

    pub fn generator(&self) -> &AnswerGenerator {
        &self.generator
    }

    /// Retrieve passages and build the grounded prompt
    pub async fn prepare(&self, request: &ValidChatRequest) -> Result<PreparedPrompt> {
        let matches = self
            .retriever
            .retrieve(&request.question, &request.document_id)
            .await?;

        if matches.is_empty() {
            tracing::warn!(
                "[{}] No passages matched; answering from empty context",
                request.document_id
            );
        }

        let context = PromptBuilder::build_context(&matches);
        Ok(PreparedPrompt {
            prompt: PromptBuilder::build_chat_prompt(&context, &request.question),
            pages: retrieved_pages(&matches),
        })
    }

    /// Answer a question in one response
    pub async fn answer(&self, request: &ValidChatRequest) -> Result<ChatResponse> {
        let prepared = self.prepare(request).await?;

        tracing::info!("[{}] Generating answer...", request.document_id);
        let generated = self.generator.generate(&prepared.prompt).await?;

        let citations = extract_page_citations(&generated.text, Some(&prepared.pages));
        tracing::info!(
            "[{}] Answer generated by {} with {} citations.",
            request.document_id,
            generated.model,
            citations.len()
        );

        Ok(ChatResponse {
            answer: generated.text,
            citations,
        })
    }

    /// Answer a question as a stream of text pieces
    pub async fn answer_stream(&self, request: &ValidChatRequest) -> Result<AnswerStream> {
        let prepared = self.prepare(request).await?;

        tracing::info!("[{}] Streaming answer...", request.document_id);
        let (text, model) = self.generator.generate_stream(&prepared.prompt).await?;
        tracing::info!("[{}] Streaming from {}", request.document_id, model);

        Ok(AnswerStream {
            text,
            pages: prepared.pages,
            model,
        })
    }
}
