//! Prompt templates for grounded PDF answers

use crate::types::VectorMatch;

/// Prompt builder for chat queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build context from retrieved passages, one `Page N: "..."` entry each
    pub fn build_context(matches: &[VectorMatch]) -> String {
        matches
            .iter()
            .map(|m| format!("Page {}: \"{}\"", m.metadata.page_number, m.metadata.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the full grounded prompt
    pub fn build_chat_prompt(context: &str, question: &str) -> String {
        format!(
            r#"You are a document assistant. Give accurate, well-structured answers that rely exclusively on the document context below.

RULES YOU MUST FOLLOW:
1. **USE ONLY THE CONTEXT BELOW.** Never draw on outside knowledge, training data or anything not present in the context.
2. **IF THE CONTEXT DOES NOT CONTAIN THE ANSWER, SAY SO.** Reply with: "I cannot answer this question based on the provided document. The document does not contain information about [topic]."
   - Name the specific information that is missing
   - Never fall back to general knowledge
3. Formatting:
   - Use bullet points (*) for lists
   - Use **bold** for key terms
   - Split long answers into short paragraphs
   - Keep a clear, professional tone
   - **Do not open with phrases such as "Based on the document provided" or "According to the context"; answer directly**
4. **CITATIONS:**
   - Cite a page as (Page X) only when the context shows the information under "Page X:"
   - If you cannot tell which page a statement comes from, leave it uncited
   - No citation is better than a wrong one
   - Place citations inline, at the end of the statement they support
5. Prefer accuracy over completeness. Never guess or fill gaps.

--- DOCUMENT CONTEXT ---
{context}
--- END CONTEXT ---

USER QUESTION: {question}

ANSWER:"#,
            context = context,
            question = question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    fn vector_match(page: u32, text: &str) -> VectorMatch {
        VectorMatch {
            id: format!("d-chunk-{}", page),
            score: 0.8,
            metadata: ChunkMetadata {
                document_id: "d".to_string(),
                text: text.to_string(),
                page_number: page,
            },
        }
    }

    #[test]
    fn test_build_context() {
        let context = PromptBuilder::build_context(&[
            vector_match(3, "Net income rose."),
            vector_match(7, "Headcount fell."),
        ]);
        assert_eq!(
            context,
            "Page 3: \"Net income rose.\"\n\nPage 7: \"Headcount fell.\""
        );
        assert_eq!(PromptBuilder::build_context(&[]), "");
    }

    #[test]
    fn test_chat_prompt_layout() {
        let prompt = PromptBuilder::build_chat_prompt("Page 1: \"x\"", "What is x?");
        let context_at = prompt.find("--- DOCUMENT CONTEXT ---\nPage 1: \"x\"\n--- END CONTEXT ---").unwrap();
        let question_at = prompt.find("USER QUESTION: What is x?").unwrap();
        assert!(context_at < question_at);
        assert!(prompt.trim_end().ends_with("ANSWER:"));
    }
}
