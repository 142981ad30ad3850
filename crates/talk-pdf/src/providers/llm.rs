//! Chat model trait for generating answers

use async_trait::async_trait;

use crate::error::Result;

/// Trait for a hosted chat model
///
/// Implementations:
/// - `EuriChat`: hosted OpenAI-compatible chat completions endpoint
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a fully composed prompt and return the model's text response
    async fn complete(&self, prompt: &str) -> Result<String>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
