use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::application::use_cases::insight_synthesizer::{
    GenerationCascade, InsightSynthesizer, PromptTemplates,
};
use crate::application::use_cases::sentiment::SentimentEngine;
use crate::application::use_cases::survey_pipeline::{PipelineOptions, SurveyPipeline};
use crate::application::use_cases::tokenizer::DictionaryTokenizer;
use crate::domain::error::{AppError, Result};
use crate::domain::lexicon::Lexicon;
use crate::domain::strategy::StrategyId;
use crate::infrastructure::config::{ApiProvider, ConfigService, Settings};
use crate::infrastructure::llm_clients::GeminiClient;
use crate::infrastructure::sentiment_api::ssense::SsenseClient;

/// Builds a ready pipeline: loads the lexicon and prompt templates, resolves
/// API keys and activates the configured default strategy.
pub async fn build_pipeline(settings: &Settings, config_service: &ConfigService) -> Result<SurveyPipeline> {
    let lexicon = Arc::new(Lexicon::load(settings.lexicon_path.as_deref())?);
    let prompts = Arc::new(PromptTemplates::load(settings.prompts_path.as_deref())?);
    info!(
        lexicon_version = %lexicon.version,
        prompt_version = %prompts.version,
        "Loaded vocabulary and prompt templates"
    );

    let strategy = StrategyId::try_from(settings.default_strategy).map_err(|id| {
        AppError::Configuration(format!("Unknown default strategy id: {}", id))
    })?;

    let ssense_key = config_service.resolve_api_key(
        ApiProvider::Ssense,
        settings.sentiment_api.api_key.as_deref(),
    );
    if ssense_key.is_none() && strategy == StrategyId::Remote {
        warn!("SSense API key not configured; remote sentiment will use the lexicon");
    }
    let sentiment_api = Arc::new(SsenseClient::new(
        &settings.sentiment_api.base_url,
        ssense_key,
        settings.sentiment_api.timeout_secs,
    ));

    let tokenizer = Arc::new(DictionaryTokenizer::from_lexicon(&lexicon));
    let engine = Arc::new(SentimentEngine::new(
        lexicon.clone(),
        tokenizer,
        sentiment_api,
        settings.corpus.clone(),
    ));
    engine.initialize(strategy).await;

    let gemini_key =
        config_service.resolve_api_key(ApiProvider::Gemini, settings.gemini.api_key.as_deref());
    if gemini_key.is_none() {
        warn!("Gemini API key not configured; insights will use rule-based output");
    }
    let cascade = GenerationCascade::new(
        Arc::new(GeminiClient::new()),
        settings.generation_profiles(gemini_key),
        Duration::from_millis(settings.gemini.rate_limit_backoff_ms),
    );
    let synthesizer = InsightSynthesizer::new(cascade, prompts, lexicon.insight.clone());

    Ok(SurveyPipeline::new(
        engine,
        synthesizer,
        PipelineOptions {
            keyword_limit: settings.keyword_limit,
            sample_limit: settings.sample_limit,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::ResponseTable;

    #[tokio::test]
    async fn builds_a_lexicon_pipeline_from_defaults() {
        let settings = Settings {
            corpus: crate::infrastructure::config::CorpusSettings {
                path: None,
                ..Settings::default().corpus
            },
            ..Settings::default()
        };
        let pipeline = build_pipeline(&settings, &ConfigService::new())
            .await
            .unwrap();

        let info = pipeline.engine().get_active_strategy_info().unwrap();
        assert_eq!(info.active.strategy, StrategyId::Lexicon);

        let result = pipeline
            .analyze(&ResponseTable::default(), "empty")
            .await
            .unwrap();
        assert_eq!(result.total_responses, 0);
    }

    #[tokio::test]
    async fn missing_prompt_override_fails_fast() {
        let settings = Settings {
            prompts_path: Some("/nonexistent/prompts.toml".into()),
            ..Settings::default()
        };
        assert!(matches!(
            build_pipeline(&settings, &ConfigService::new()).await,
            Err(AppError::Configuration(_))
        ));
    }
}
