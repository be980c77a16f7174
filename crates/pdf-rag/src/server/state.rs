//! Application state for the HTTP server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::{AnswerGenerator, ChatPipeline};
use crate::ingestion::{build_parser, DocumentParser, IngestPipeline};
use crate::providers::{
    EmbeddingProvider, GeminiEmbedder, GeminiLlm, LlmProvider, PineconeStore,
    VectorStoreProvider,
};
use crate::retrieval::Retriever;

/// The external services the pipeline runs against
#[derive(Clone)]
pub struct Providers {
    pub parser: Arc<dyn DocumentParser>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub vector_store: Arc<dyn VectorStoreProvider>,
    pub primary_llm: Arc<dyn LlmProvider>,
    pub fallback_llm: Arc<dyn LlmProvider>,
}

impl Providers {
    /// Build the hosted providers named in config
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        Ok(Self {
            parser: build_parser(&config.parser)?,
            embedder: Arc::new(GeminiEmbedder::new(&config.embeddings)?),
            vector_store: Arc::new(PineconeStore::new(&config.vector_db)?),
            primary_llm: Arc::new(GeminiLlm::primary(&config.llm)?),
            fallback_llm: Arc::new(GeminiLlm::fallback(&config.llm)?),
        })
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    providers: Providers,
    ingest: IngestPipeline,
    chat: ChatPipeline,
}

impl AppState {
    /// Create state backed by the hosted services
    pub fn new(config: RagConfig) -> Result<Self> {
        config.validate()?;
        let providers = Providers::from_config(&config)?;

        tracing::info!("Parser: {}", providers.parser.name());
        tracing::info!(
            "Embeddings: {} ({} dims)",
            providers.embedder.name(),
            providers.embedder.dimensions()
        );
        tracing::info!("Vector store: {}", providers.vector_store.name());
        tracing::info!(
            "LLM: {} (fallback: {})",
            providers.primary_llm.model(),
            providers.fallback_llm.model()
        );

        Ok(Self::with_providers(config, providers))
    }

    /// Create state from explicit providers
    pub fn with_providers(config: RagConfig, providers: Providers) -> Self {
        let ingest = IngestPipeline::new(
            providers.embedder.clone(),
            providers.vector_store.clone(),
            config.embeddings.batch_size,
        );
        let chat = ChatPipeline::new(
            Retriever::new(
                providers.embedder.clone(),
                providers.vector_store.clone(),
                config.retrieval.top_k,
            ),
            AnswerGenerator::new(providers.primary_llm.clone(), providers.fallback_llm.clone()),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                providers,
                ingest,
                chat,
            }),
        }
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn parser(&self) -> &Arc<dyn DocumentParser> {
        &self.inner.providers.parser
    }

    pub fn ingest(&self) -> &IngestPipeline {
        &self.inner.ingest
    }

    pub fn chat(&self) -> &ChatPipeline {
        &self.inner.chat
    }

    /// Whether the embedding, vector and primary LLM services respond
    pub async fn is_ready(&self) -> bool {
        let providers = &self.inner.providers;
        let (embedder, store, llm) = tokio::join!(
            providers.embedder.health_check(),
            providers.vector_store.health_check(),
            providers.primary_llm.health_check(),
        );

        let ready = matches!(
            (embedder, store, llm),
            (Ok(true), Ok(true), Ok(true))
        );
        if !ready {
            tracing::warn!("Readiness check failed");
        }
        ready
    }
}
