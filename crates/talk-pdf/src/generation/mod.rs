//! Answer generation: prompt templates and the hosted model client

pub mod euri;
pub mod prompt;

pub use euri::EuriClient;
pub use prompt::PromptBuilder;
