//! Provider abstractions for embeddings and the chat model

pub mod embedding;
pub mod euri;
pub mod llm;

pub use embedding::EmbeddingProvider;
pub use euri::{EuriChat, EuriEmbedder, Providers};
pub use llm::ChatModel;

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    use super::{ChatModel, EmbeddingProvider, Providers};
    use crate::error::{Error, Result};

    /// Vocabulary of the keyword embedder; one dimension per word
    const VOCABULARY: [&str; 6] = ["rust", "python", "memory", "garbage", "ownership", "snake"];

    /// Deterministic embedder counting vocabulary words
    pub struct KeywordEmbedder;

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(VOCABULARY
                .iter()
                .map(|word| lower.matches(word).count() as f32)
                .collect())
        }

        fn dimensions(&self) -> usize {
            VOCABULARY.len()
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    /// Chat model that records prompts and answers with a fixed reply
    #[derive(Default)]
    pub struct RecordingChat {
        pub prompts: Mutex<Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl ChatModel for RecordingChat {
        async fn complete(&self, prompt: &str) -> Result<String> {
            if self.fail {
                return Err(Error::llm("model unavailable"));
            }
            self.prompts.lock().push(prompt.to_string());
            Ok("Grounded answer".to_string())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(!self.fail)
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "recording-1"
        }
    }

    pub fn providers() -> (Providers, Arc<RecordingChat>) {
        let chat = Arc::new(RecordingChat::default());
        (Providers::new(Arc::new(KeywordEmbedder), chat.clone()), chat)
    }
}
