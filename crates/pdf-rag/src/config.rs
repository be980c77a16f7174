//! Configuration for the PDF chat backend

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Upload validation limits
    pub upload: UploadConfig,
    /// PDF parser configuration
    pub parser: ParserConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Gemini generation configuration
    pub llm: LlmConfig,
    /// Vector database configuration
    pub vector_db: VectorDbConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Load configuration: defaults, then an optional TOML file, then the environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Failed to read .env file: {}", e);
            }
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }

    /// Overlay values from environment variables
    pub fn apply_env<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(key) = get("GOOGLE_API_KEY") {
            self.llm.api_key = Some(key.clone());
            self.embeddings.api_key = Some(key);
        }
        if let Some(model) = get("GEMINI_PRIMARY_MODEL") {
            self.llm.primary_model = model;
        }
        if let Some(model) = get("GEMINI_FALLBACK_MODEL") {
            self.llm.fallback_model = model;
        }
        if let Some(model) = get("GEMINI_EMBEDDING_MODEL") {
            self.embeddings.model = model;
        }
        if let Some(key) = get("PINECONE_API_KEY") {
            self.vector_db.api_key = Some(key);
        }
        if let Some(host) = get("PINECONE_INDEX_HOST") {
            self.vector_db.index_host = Some(host);
        }
        if let Some(namespace) = get("PINECONE_NAMESPACE") {
            self.vector_db.namespace = Some(namespace);
        }
        if let Some(key) = get("LLAMA_CLOUD_API_KEY") {
            self.parser.api_key = Some(key);
        }
        if let Some(backend) = get("PARSER_BACKEND") {
            match backend.to_lowercase().as_str() {
                "llamaparse" => self.parser.backend = ParserBackend::LlamaParse,
                "local" => self.parser.backend = ParserBackend::Local,
                other => tracing::warn!("Ignoring unknown PARSER_BACKEND '{}'", other),
            }
        }
    }

    /// Check that every selected backend has its credentials
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_key.is_none() || self.embeddings.api_key.is_none() {
            return Err(Error::Config("Missing GOOGLE_API_KEY".to_string()));
        }
        if self.vector_db.api_key.is_none() || self.vector_db.index_host.is_none() {
            return Err(Error::Config(
                "Missing Pinecone settings (PINECONE_API_KEY, PINECONE_INDEX_HOST)".to_string(),
            ));
        }
        if self.parser.backend == ParserBackend::LlamaParse && self.parser.api_key.is_none() {
            return Err(Error::Config(
                "Missing LLAMA_CLOUD_API_KEY (or set PARSER_BACKEND=local)".to_string(),
            ));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::Config("embeddings.batch_size must be at least 1".to_string()));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
        }
    }
}

/// Upload validation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Multipart field carrying the PDF
    pub field_name: String,
    /// Maximum accepted PDF size in bytes (default: 50MB)
    pub max_file_size: usize,
    /// Accepted content types
    pub allowed_mime_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: "pdfFile".to_string(),
            max_file_size: 50 * 1024 * 1024,
            allowed_mime_types: vec!["application/pdf".to_string()],
        }
    }
}

impl UploadConfig {
    /// Request body limit for the upload route, leaving room for multipart framing
    pub fn body_limit(&self) -> usize {
        self.max_file_size + 1024 * 1024
    }
}

/// Which parser turns PDFs into page chunks
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParserBackend {
    /// LlamaParse cloud API
    #[default]
    LlamaParse,
    /// In-process lopdf text extraction
    Local,
}

/// PDF parser configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Parser backend
    pub backend: ParserBackend,
    /// LlamaParse API key
    pub api_key: Option<String>,
    /// LlamaParse base URL
    pub base_url: String,
    /// Seconds between job status polls
    pub poll_interval_secs: u64,
    /// Give up on a parsing job after this many seconds
    pub max_wait_secs: u64,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            backend: ParserBackend::LlamaParse,
            api_key: None,
            base_url: "https://api.cloud.llamaindex.ai".to_string(),
            poll_interval_secs: 2,
            max_wait_secs: 300,
            timeout_secs: 60,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Google API key
    pub api_key: Option<String>,
    /// Generative Language API base URL
    pub base_url: String,
    /// Embedding model
    pub model: String,
    /// Embedding dimensions (768 for text-embedding-004)
    pub dimensions: usize,
    /// Chunks per embed-then-upsert batch
    pub batch_size: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "text-embedding-004".to_string(),
            dimensions: 768,
            batch_size: 100,
            timeout_secs: 30,
        }
    }
}

/// Gemini generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Google API key
    pub api_key: Option<String>,
    /// Generative Language API base URL
    pub base_url: String,
    /// Model tried first
    pub primary_model: String,
    /// Model used when the primary fails
    pub fallback_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum output tokens
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            primary_model: "gemini-2.5-pro".to_string(),
            fallback_model: "gemini-2.5-flash".to_string(),
            temperature: 0.2,
            max_output_tokens: 4096,
            timeout_secs: 120,
        }
    }
}

/// Vector database (Pinecone) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Pinecone API key
    pub api_key: Option<String>,
    /// Index host, e.g. "https://my-index-abc123.svc.us-east-1.pinecone.io"
    pub index_host: Option<String>,
    /// Optional namespace inside the index
    pub namespace: Option<String>,
    /// Pinecone API version header
    pub api_version: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            index_host: None,
            namespace: None,
            api_version: "2024-07".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages retrieved per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.embeddings.batch_size, 100);
        assert_eq!(config.llm.primary_model, "gemini-2.5-pro");
        assert_eq!(config.llm.fallback_model, "gemini-2.5-flash");
        assert_eq!(config.upload.max_file_size, 50 * 1024 * 1024);
    }

    #[test]
    fn test_apply_env() {
        let vars = env(&[
            ("PORT", "9001"),
            ("GOOGLE_API_KEY", "g-key"),
            ("PINECONE_API_KEY", "p-key"),
            ("PINECONE_INDEX_HOST", "https://idx.pinecone.io"),
            ("PARSER_BACKEND", "local"),
            ("GEMINI_FALLBACK_MODEL", "gemini-2.0-flash"),
        ]);

        let mut config = RagConfig::default();
        config.apply_env(|k| vars.get(k).cloned());

        assert_eq!(config.server.port, 9001);
        assert_eq!(config.llm.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.embeddings.api_key.as_deref(), Some("g-key"));
        assert_eq!(config.parser.backend, ParserBackend::Local);
        assert_eq!(config.llm.fallback_model, "gemini-2.0-flash");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_keys() {
        let config = RagConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let vars = env(&[
            ("GOOGLE_API_KEY", "g-key"),
            ("PINECONE_API_KEY", "p-key"),
            ("PINECONE_INDEX_HOST", "https://idx.pinecone.io"),
        ]);
        let mut config = RagConfig::default();
        config.apply_env(|k| vars.get(k).cloned());
        // LlamaParse is the default backend and has no key yet
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let vars = env(&[("PORT", "  "), ("GOOGLE_API_KEY", "")]);
        let mut config = RagConfig::default();
        config.apply_env(|k| vars.get(k).cloned());
        assert_eq!(config.server.port, 8000);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config: RagConfig = toml::from_str(
            r#"
            [server]
            port = 3000

            [retrieval]
            top_k = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.retrieval.top_k, 8);
        assert_eq!(config.embeddings.model, "text-embedding-004");
    }
}
