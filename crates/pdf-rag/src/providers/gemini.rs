//! Gemini providers for embeddings and answer generation
//!
//! Both talk to the Generative Language API with an API key:
//! - `GeminiEmbedder`: `models/{model}:embedContent` (text-embedding-004)
//! - `GeminiLlm`: `models/{model}:generateContent` and
//!   `models/{model}:streamGenerateContent?alt=sse`

use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use reqwest_eventsource::{retry::Never, Error as EventSourceError, Event, EventSource};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::llm::{LlmProvider, TextStream};

const API_KEY_HEADER: &str = "x-goog-api-key";

fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .pool_max_idle_per_host(5)
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}

fn require_key(key: &Option<String>) -> Result<String> {
    key.clone()
        .ok_or_else(|| Error::Config("Missing GOOGLE_API_KEY".to_string()))
}

/// Embedding task type understood by the Gemini embedding models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: String,
    content: RequestContent<'a>,
    task_type: TaskType,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini embedding provider
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    /// Create a new embedder from config
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            api_key: require_key(&config.api_key)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:embedContent", self.base_url, self.model)
    }

    async fn embed(&self, text: &str, task_type: TaskType) -> Result<Vec<f32>> {
        let request = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text }],
            },
            task_type,
        };

        let response = self
            .client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("Gemini embed request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "Gemini embedding failed ({}): {}",
                status, body
            )));
        }

        let parsed: EmbedContentResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("Failed to parse embedding response: {}", e)))?;

        if parsed.embedding.values.is_empty() {
            return Err(Error::embedding("Empty embedding in response"));
        }

        Ok(parsed.embedding.values)
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    async fn embed_document(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text, TaskType::RetrievalDocument).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(text, TaskType::RetrievalQuery).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        model_reachable(&self.client, &self.base_url, &self.model, &self.api_key).await
    }

    fn name(&self) -> &str {
        "gemini-embedding"
    }
}

async fn model_reachable(client: &Client, base_url: &str, model: &str, api_key: &str) -> Result<bool> {
    let url = format!("{}/v1beta/models/{}", base_url, model);
    match client.get(&url).header(API_KEY_HEADER, api_key).send().await {
        Ok(response) => Ok(response.status().is_success()),
        Err(_) => Ok(false),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

impl GenerateResponse {
    /// Answer text of the first candidate, skipping thought parts
    pub(crate) fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|p| !p.thought)
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Turn one streamed SSE payload into answer text
fn parse_stream_payload(payload: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(payload)
        .map_err(|e| Error::llm(format!("Malformed Gemini stream payload: {}", e)))?;
    if let Some(err) = parsed.error {
        return Err(Error::llm(format!(
            "Gemini stream error ({}): {}",
            err.code, err.message
        )));
    }
    Ok(parsed.text())
}

/// Answer text from a Gemini SSE response
///
/// The source never reconnects: the first transport or status error is
/// yielded as the last item.
fn event_text_stream(mut source: EventSource, model: String) -> TextStream {
    source.set_retry_policy(Box::new(Never));

    futures::stream::unfold(Some(source), move |source| {
        let model = model.clone();
        async move {
            let mut source = source?;
            loop {
                match source.next().await {
                    Some(Ok(Event::Open)) => continue,
                    Some(Ok(Event::Message(message))) => match parse_stream_payload(&message.data) {
                        Ok(text) if text.is_empty() => continue,
                        Ok(text) => return Some((Ok(text), Some(source))),
                        Err(e) => {
                            source.close();
                            return Some((Err(e), None));
                        }
                    },
                    Some(Err(EventSourceError::StreamEnded)) | None => {
                        source.close();
                        return None;
                    }
                    Some(Err(e)) => {
                        source.close();
                        return Some((Err(stream_error(&model, e).await), None));
                    }
                }
            }
        }
    })
    .boxed()
}

async fn stream_error(model: &str, error: EventSourceError) -> Error {
    match error {
        EventSourceError::InvalidStatusCode(status, response) => {
            let body = response.text().await.unwrap_or_default();
            Error::llm(format!("{} generation failed ({}): {}", model, status, body))
        }
        other => Error::llm(format!("{} stream interrupted: {}", model, other)),
    }
}

/// Gemini generation provider for a single model
pub struct GeminiLlm {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiLlm {
    /// Create a client for `model` using the shared LLM settings
    pub fn new(config: &LlmConfig, model: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client(config.timeout_secs)?,
            api_key: require_key(&config.api_key)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: model.into(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    /// The configured primary model
    pub fn primary(config: &LlmConfig) -> Result<Self> {
        Self::new(config, config.primary_model.clone())
    }

    /// The configured fallback model
    pub fn fallback(config: &LlmConfig) -> Result<Self> {
        Self::new(config, config.fallback_model.clone())
    }

    fn request<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![RequestContent {
                role: Some("user"),
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }

    async fn send(&self, url: String, prompt: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.request(prompt))
            .send()
            .await
            .map_err(|e| Error::llm(format!("{} request failed: {}", self.model, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::llm(format!(
                "{} generation failed ({}): {}",
                self.model, status, body
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for GeminiLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let response = self.send(url, prompt).await?;

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::llm(format!("Failed to parse Gemini response: {}", e)))?;

        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(Error::llm(format!("No text in {} response", self.model)));
        }
        Ok(text)
    }

    async fn generate_stream(&self, prompt: &str) -> Result<TextStream> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        let request = self
            .client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.request(prompt));

        let source = EventSource::new(request)
            .map_err(|e| Error::llm(format!("{} stream request failed: {}", self.model, e)))?;
        Ok(event_text_stream(source, self.model.clone()))
    }

    async fn health_check(&self) -> Result<bool> {
        model_reachable(&self.client, &self.base_url, &self.model, &self.api_key).await
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
