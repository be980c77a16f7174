//! Document ingestion: upload validation, PDF parsing, embedding and storage

pub mod llama_parse;
mod parser;
mod processor;
pub mod validation;

pub use llama_parse::LlamaParseClient;
pub use parser::{build_parser, DocumentParser, LocalPdfParser};
pub use processor::IngestPipeline;
pub use validation::{size_exceeded_message, validate_pdf_upload, UploadedFile};
