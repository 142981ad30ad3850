//! Prompt templates for document question answering

use crate::retrieval::SearchResult;

/// Prompt builder for document questions
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join retrieved chunk texts into the context block
    pub fn build_context(results: &[SearchResult]) -> String {
        results
            .iter()
            .map(|r| r.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Build the full assistant prompt
    pub fn build_prompt(question: &str, context: &str) -> String {
        format!(
            r#"You are Talk with PDF, a smart document assistant.
Based on the user's documents, answer the question clearly and accurately.
If the information is not in the documents, clearly state that.

Documents:
{context}

Question: {question}

Answer:"#,
            context = context,
            question = question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, ChunkSource};
    use uuid::Uuid;

    fn result(content: &str, page: u32) -> SearchResult {
        let source = ChunkSource {
            filename: "guide.pdf".to_string(),
            page_number: Some(page),
            page_count: Some(5),
        };
        SearchResult {
            chunk: Chunk::new(Uuid::new_v4(), content.to_string(), source, 0, 0),
            score: 0.0,
        }
    }

    #[test]
    fn test_context_joins_with_blank_line() {
        let results = vec![result("first", 1), result("second", 2)];
        assert_eq!(PromptBuilder::build_context(&results), "first\n\nsecond");
        assert_eq!(PromptBuilder::build_context(&[]), "");
    }

    #[test]
    fn test_prompt_contains_context_and_question() {
        let prompt = PromptBuilder::build_prompt("What is covered?", "Chapter one text");

        assert!(prompt.starts_with("You are Talk with PDF"));
        assert!(prompt.contains("Documents:\nChapter one text\n\nQuestion: What is covered?"));
        assert!(prompt.ends_with("Answer:"));
    }
}
