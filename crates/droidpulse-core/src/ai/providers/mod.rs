mod claude_api;
mod gemini_api;
mod openai;

pub use claude_api::ClaudeApiProvider;
pub use gemini_api::GeminiApiProvider;
pub use openai::OpenAiProvider;

use crate::Result;

/// Trait for generative text providers
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &str;

    /// Send a single prompt and return the model's free-text reply
    async fn generate(&self, prompt: &str) -> Result<String>;
}
