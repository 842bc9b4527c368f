pub mod gemini;

use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::remote::RemoteFailure;
use async_trait::async_trait;

pub use gemini::GeminiClient;

/// Single generative call against one model configuration.
#[async_trait]
pub trait LLMClient: Send + Sync {
    async fn generate(&self, config: &LLMConfig, prompt: &str) -> Result<String, RemoteFailure>;
}
