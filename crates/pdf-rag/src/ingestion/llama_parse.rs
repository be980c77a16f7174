//! LlamaParse cloud parsing client
//!
//! Parsing is an asynchronous job: upload the file, poll the job until it
//! finishes, then fetch the per-page JSON result (markdown per page).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::config::ParserConfig;
use crate::error::{Error, Result};
use crate::types::PdfChunk;

use super::parser::DocumentParser;

/// LlamaParse API client
pub struct LlamaParseClient {
    client: Client,
    api_key: String,
    base_url: String,
    poll_interval: Duration,
    max_wait: Duration,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    id: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JobStatus {
    Pending,
    Success,
    Failed,
}

impl JobStatus {
    fn from_api(status: Option<&str>) -> Self {
        match status.map(|s| s.to_ascii_uppercase()).as_deref() {
            Some("SUCCESS") | Some("PARTIAL_SUCCESS") => Self::Success,
            Some("ERROR") | Some("CANCELED") | Some("CANCELLED") => Self::Failed,
            _ => Self::Pending,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct JsonResult {
    #[serde(default)]
    pages: Vec<ResultPage>,
}

#[derive(Debug, Default, Deserialize)]
struct ResultPage {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    page_label: Option<String>,
    #[serde(default)]
    md: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl ResultPage {
    /// Page number from the label, else the page index, else 0
    fn page_number(&self) -> u32 {
        self.page_label
            .as_deref()
            .and_then(|label| label.trim().parse().ok())
            .or(self.page)
            .unwrap_or(0)
    }

    fn into_chunk(self) -> Option<PdfChunk> {
        let page_number = self.page_number();
        let text = self
            .md
            .filter(|md| !md.trim().is_empty())
            .or(self.text)?;
        let chunk = PdfChunk::new(text, page_number);
        chunk.has_text().then_some(chunk)
    }
}

impl LlamaParseClient {
    /// Create a new client from config
    pub fn new(config: &ParserConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("Missing LLAMA_CLOUD_API_KEY".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_secs(config.poll_interval_secs.max(1)),
            max_wait: Duration::from_secs(config.max_wait_secs),
        })
    }

    async fn upload(&self, filename: &str, data: &[u8]) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str("application/pdf")
            .map_err(|e| Error::Internal(format!("Invalid multipart mime: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(format!("{}/api/parsing/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::file_parse(filename, format!("LlamaParse upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::file_parse(
                filename,
                format!("LlamaParse upload rejected ({}): {}", status, body),
            ));
        }

        let job: JobResponse = response
            .json()
            .await
            .map_err(|e| Error::file_parse(filename, format!("Bad LlamaParse upload response: {}", e)))?;
        Ok(job.id)
    }

    async fn wait_for_job(&self, filename: &str, job_id: &str) -> Result<()> {
        let started = Instant::now();
        loop {
            let response = self
                .client
                .get(format!("{}/api/parsing/job/{}", self.base_url, job_id))
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| Error::file_parse(filename, format!("LlamaParse status check failed: {}", e)))?;

            if !response.status().is_success() {
                let status = response.status();
                return Err(Error::file_parse(
                    filename,
                    format!("LlamaParse status check failed ({})", status),
                ));
            }

            let job: JobResponse = response
                .json()
                .await
                .map_err(|e| Error::file_parse(filename, format!("Bad LlamaParse job response: {}", e)))?;

            match JobStatus::from_api(job.status.as_deref()) {
                JobStatus::Success => return Ok(()),
                JobStatus::Failed => {
                    return Err(Error::file_parse(
                        filename,
                        format!("LlamaParse job {} did not succeed", job_id),
                    ))
                }
                JobStatus::Pending => {}
            }

            if started.elapsed() >= self.max_wait {
                return Err(Error::file_parse(
                    filename,
                    format!(
                        "LlamaParse job {} still running after {}s",
                        job_id,
                        self.max_wait.as_secs()
                    ),
                ));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn fetch_result(&self, filename: &str, job_id: &str) -> Result<Vec<PdfChunk>> {
        let response = self
            .client
            .get(format!("{}/api/parsing/job/{}/result/json", self.base_url, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| Error::file_parse(filename, format!("LlamaParse result fetch failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Error::file_parse(
                filename,
                format!("LlamaParse result fetch failed ({})", status),
            ));
        }

        let result: JsonResult = response
            .json()
            .await
            .map_err(|e| Error::file_parse(filename, format!("Bad LlamaParse result: {}", e)))?;

        Ok(pages_to_chunks(result))
    }
}

fn pages_to_chunks(result: JsonResult) -> Vec<PdfChunk> {
    result
        .pages
        .into_iter()
        .filter_map(ResultPage::into_chunk)
        .collect()
}

#[async_trait]
impl DocumentParser for LlamaParseClient {
    async fn parse(&self, filename: &str, data: &[u8]) -> Result<Vec<PdfChunk>> {
        let job_id = self.upload(filename, data).await?;
        tracing::debug!("LlamaParse job {} created for {}", job_id, filename);

        self.wait_for_job(filename, &job_id).await?;
        self.fetch_result(filename, &job_id).await
    }

    fn name(&self) -> &str {
        "llamaparse"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status() {
        assert_eq!(JobStatus::from_api(Some("SUCCESS")), JobStatus::Success);
        assert_eq!(JobStatus::from_api(Some("success")), JobStatus::Success);
        assert_eq!(JobStatus::from_api(Some("PARTIAL_SUCCESS")), JobStatus::Success);
        assert_eq!(JobStatus::from_api(Some("ERROR")), JobStatus::Failed);
        assert_eq!(JobStatus::from_api(Some("CANCELED")), JobStatus::Failed);
        assert_eq!(JobStatus::from_api(Some("PENDING")), JobStatus::Pending);
        assert_eq!(JobStatus::from_api(None), JobStatus::Pending);
    }

    #[test]
    fn test_pages_to_chunks() {
        let result: JsonResult = serde_json::from_str(
            r##"{"pages":[
                {"page":1,"md":"# Intro\nHello","text":"Intro Hello"},
                {"page":2,"page_label":"iv","md":"","text":"Roman numbered"},
                {"page":3,"page_label":"7","md":"Body"},
                {"page":4,"md":"   ","text":""}
            ]}"##,
        )
        .unwrap();

        let chunks = pages_to_chunks(result);
        assert_eq!(
            chunks,
            vec![
                PdfChunk::new("# Intro\nHello", 1),
                PdfChunk::new("Roman numbered", 2),
                PdfChunk::new("Body", 7),
            ]
        );
    }

    #[test]
    fn test_page_number_unknown() {
        let page = ResultPage {
            md: Some("text".to_string()),
            ..ResultPage::default()
        };
        assert_eq!(page.page_number(), 0);
    }
}
