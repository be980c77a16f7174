//! PDF parsing into page-tagged chunks

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::{ParserBackend, ParserConfig};
use crate::error::{Error, Result};
use crate::types::PdfChunk;

use super::llama_parse::LlamaParseClient;

/// Turns an uploaded PDF into text chunks with page numbers
#[async_trait]
pub trait DocumentParser: Send + Sync {
    /// Parse raw PDF bytes
    async fn parse(&self, filename: &str, data: &[u8]) -> Result<Vec<PdfChunk>>;

    /// Get parser name for logging
    fn name(&self) -> &str;
}

/// Build the parser selected in config
pub fn build_parser(config: &ParserConfig) -> Result<Arc<dyn DocumentParser>> {
    match config.backend {
        ParserBackend::LlamaParse => Ok(Arc::new(LlamaParseClient::new(config)?)),
        ParserBackend::Local => Ok(Arc::new(LocalPdfParser)),
    }
}

/// In-process page-by-page text extraction with lopdf
///
/// Produces plain text rather than markdown, but needs no network access.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPdfParser;

impl LocalPdfParser {
    fn extract_pages(filename: &str, data: &[u8]) -> Result<Vec<PdfChunk>> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::file_parse(filename, format!("Failed to load PDF: {}", e)))?;

        let mut chunks = Vec::new();
        for page_number in doc.get_pages().into_keys() {
            match doc.extract_text(&[page_number]) {
                Ok(text) => {
                    let text = cleanup_text(&text);
                    if !text.is_empty() {
                        chunks.push(PdfChunk::new(text, page_number));
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping page {} of {}: {}", page_number, filename, e);
                }
            }
        }
        Ok(chunks)
    }
}

#[async_trait]
impl DocumentParser for LocalPdfParser {
    async fn parse(&self, filename: &str, data: &[u8]) -> Result<Vec<PdfChunk>> {
        let name = filename.to_string();
        let bytes = data.to_vec();
        tokio::task::spawn_blocking(move || LocalPdfParser::extract_pages(&name, &bytes))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    fn name(&self) -> &str {
        "lopdf"
    }
}

/// Strip NULs and collapse blank lines left by content-stream extraction
fn cleanup_text(text: &str) -> String {
    text.replace('\0', "")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_text() {
        assert_eq!(cleanup_text("  Title \0\n\n\n  body line  \n"), "Title\nbody line");
        assert_eq!(cleanup_text(" \n \n"), "");
    }

    #[tokio::test]
    async fn test_local_parser_rejects_garbage() {
        let err = LocalPdfParser
            .parse("broken.pdf", b"definitely not a pdf")
            .await
            .unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_build_local_parser() {
        let config = ParserConfig {
            backend: ParserBackend::Local,
            ..ParserConfig::default()
        };
        let parser = build_parser(&config).unwrap();
        assert_eq!(parser.name(), "lopdf");
    }

    #[test]
    fn test_llamaparse_requires_key() {
        let config = ParserConfig::default();
        assert!(build_parser(&config).is_err());
    }
}
