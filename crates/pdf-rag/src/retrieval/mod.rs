//! Retrieval of relevant passages for a question

pub mod search;

pub use search::{retrieved_pages, Retriever};
