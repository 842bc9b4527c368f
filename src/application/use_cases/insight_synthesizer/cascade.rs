use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::llm_clients::LLMClient;
use crate::infrastructure::remote::RemoteFailure;

/// Raw text accepted from one model of the cascade.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub model: String,
}

/// Ordered model profiles tried one after another until one answers.
pub struct GenerationCascade {
    client: Arc<dyn LLMClient>,
    profiles: Vec<LLMConfig>,
    rate_limit_backoff: Duration,
}

impl GenerationCascade {
    pub fn new(
        client: Arc<dyn LLMClient>,
        profiles: Vec<LLMConfig>,
        rate_limit_backoff: Duration,
    ) -> Self {
        Self {
            client,
            profiles,
            rate_limit_backoff,
        }
    }

    pub fn profiles(&self) -> &[LLMConfig] {
        &self.profiles
    }

    pub async fn generate(&self, prompt: &str) -> Result<Generation> {
        if self.profiles.is_empty() {
            return Err(AppError::RemoteCallFailed(
                "No generation models configured".to_string(),
            ));
        }

        let mut last_error = String::new();
        for profile in &self.profiles {
            // Hard ceiling on top of the client's own request timeout
            let outcome = timeout(
                Duration::from_secs(profile.timeout_secs),
                self.client.generate(profile, prompt),
            )
            .await
            .unwrap_or(Err(RemoteFailure::Timeout));

            match outcome {
                Ok(text) => {
                    tracing::debug!(model = %profile.model, chars = text.len(), "Model answered");
                    return Ok(Generation {
                        text,
                        model: profile.model.clone(),
                    });
                }
                Err(RemoteFailure::RateLimited) => {
                    tracing::warn!(model = %profile.model, "Rate limited, trying next model");
                    last_error = RemoteFailure::RateLimited.to_string();
                    tokio::time::sleep(self.rate_limit_backoff).await;
                }
                Err(failure) => {
                    tracing::warn!(model = %profile.model, error = %failure, "Model failed, trying next model");
                    last_error = failure.to_string();
                }
            }
        }

        Err(AppError::RemoteCallFailed(format!(
            "All {} models failed. Last error: {}",
            self.profiles.len(),
            last_error
        )))
    }
}
