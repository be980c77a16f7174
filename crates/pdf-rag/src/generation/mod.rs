//! Answer generation with prompt building, model fallback and citation handling

pub mod chat;
pub mod citation;
pub mod fallback;
pub mod prompt;

pub use chat::{AnswerStream, ChatPipeline, PreparedPrompt};
pub use citation::extract_page_citations;
pub use fallback::{AnswerGenerator, Generated};
pub use prompt::PromptBuilder;
