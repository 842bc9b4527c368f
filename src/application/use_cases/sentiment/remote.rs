use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use super::lexicon::LexiconStrategy;
use crate::domain::survey::{
    ClassificationMethod, SentimentEvidence, SentimentLabel, SentimentOutcome,
};
use crate::infrastructure::sentiment_api::SentimentApiClient;

const PROBE_TEXT: &str = "ทดสอบ";
const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Remote sentiment API, one call per text. A failed call is answered by the
/// lexicon for that text only.
pub struct RemoteStrategy {
    client: Arc<dyn SentimentApiClient>,
    fallback: LexiconStrategy,
    available: AtomicBool,
}

impl RemoteStrategy {
    pub fn new(client: Arc<dyn SentimentApiClient>, fallback: LexiconStrategy) -> Self {
        Self {
            client,
            fallback,
            available: AtomicBool::new(false),
        }
    }

    /// Sends one short request and records whether the API answered.
    pub async fn probe(&self) -> bool {
        let available = match self.client.analyze(PROBE_TEXT).await {
            Ok(_) => {
                info!("Sentiment API reachable");
                true
            }
            Err(failure) => {
                warn!(error = %failure, "Sentiment API probe failed, texts will use fallback on error");
                false
            }
        };
        self.available.store(available, Ordering::Relaxed);
        available
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    pub async fn classify(&self, text: &str) -> SentimentOutcome {
        match self.client.analyze(text).await {
            Ok(response) => SentimentOutcome {
                label: SentimentLabel::from_polarity(&response.polarity),
                confidence: response.score.unwrap_or(DEFAULT_CONFIDENCE),
                method: ClassificationMethod::RemoteApi,
                evidence: SentimentEvidence {
                    positive_count: response.positive_words.len(),
                    negative_count: response.negative_words.len(),
                    neutral_count: 0,
                    positive_words: response.positive_words,
                    negative_words: response.negative_words,
                    provider_keywords: response.keywords,
                },
            },
            Err(failure) => {
                warn!(error = %failure, "Sentiment API call failed, using rule-based result");
                SentimentOutcome {
                    method: ClassificationMethod::RemoteFallback,
                    ..self.fallback.classify(text)
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::application::use_cases::tokenizer::DictionaryTokenizer;
    use crate::domain::lexicon::Lexicon;
    use crate::infrastructure::remote::RemoteFailure;
    use crate::infrastructure::sentiment_api::SentimentApiResponse;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Answers from a fixed script; `None` entries fail with a 503.
    pub(crate) struct ScriptedApi {
        pub responses: Vec<Option<SentimentApiResponse>>,
        pub calls: AtomicUsize,
    }

    impl ScriptedApi {
        pub(crate) fn new(responses: Vec<Option<SentimentApiResponse>>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }

        pub(crate) fn unavailable() -> Self {
            Self::new(Vec::new())
        }
    }

    #[async_trait]
    impl SentimentApiClient for ScriptedApi {
        async fn analyze(&self, _text: &str) -> Result<SentimentApiResponse, RemoteFailure> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.responses.get(call).cloned().flatten() {
                Some(response) => Ok(response),
                None => Err(RemoteFailure::Status {
                    code: 503,
                    body: String::new(),
                }),
            }
        }
    }

    pub(crate) fn response(polarity: &str, score: Option<f64>) -> SentimentApiResponse {
        SentimentApiResponse {
            polarity: polarity.to_string(),
            score,
            positive_words: vec!["ดี".to_string()],
            negative_words: Vec::new(),
            keywords: vec!["ระบบ".to_string()],
        }
    }

    fn fallback() -> LexiconStrategy {
        let lexicon = Arc::new(Lexicon::embedded().unwrap());
        let tokenizer = Arc::new(DictionaryTokenizer::from_lexicon(&lexicon));
        LexiconStrategy::new(lexicon, tokenizer)
    }

    #[tokio::test]
    async fn maps_provider_polarity_and_words() {
        let api = Arc::new(ScriptedApi::new(vec![Some(response("positive", Some(0.8)))]));
        let strategy = RemoteStrategy::new(api, fallback());
        let outcome = strategy.classify("ระบบดี").await;
        assert_eq!(outcome.label, SentimentLabel::Positive);
        assert_eq!(outcome.method, ClassificationMethod::RemoteApi);
        assert!((outcome.confidence - 0.8).abs() < 1e-9);
        assert_eq!(outcome.evidence.positive_count, 1);
        assert_eq!(outcome.evidence.provider_keywords, vec!["ระบบ".to_string()]);
    }

    #[tokio::test]
    async fn missing_score_uses_default_confidence() {
        let api = Arc::new(ScriptedApi::new(vec![Some(response("mixed", None))]));
        let outcome = RemoteStrategy::new(api, fallback()).classify("x").await;
        assert_eq!(outcome.label, SentimentLabel::Neutral);
        assert!((outcome.confidence - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failure_falls_back_for_that_call_only() {
        let api = Arc::new(ScriptedApi::new(vec![
            None,
            Some(response("negative", Some(0.9))),
        ]));
        let strategy = RemoteStrategy::new(api, fallback());

        let first = strategy.classify("สับสนมาก").await;
        assert_eq!(first.method, ClassificationMethod::RemoteFallback);
        assert_eq!(first.label, SentimentLabel::Negative);

        let second = strategy.classify("สับสนมาก").await;
        assert_eq!(second.method, ClassificationMethod::RemoteApi);
    }

    #[tokio::test]
    async fn probe_records_availability() {
        let strategy = RemoteStrategy::new(Arc::new(ScriptedApi::unavailable()), fallback());
        assert!(!strategy.probe().await);
        assert!(!strategy.is_available());

        let api = Arc::new(ScriptedApi::new(vec![Some(response("neutral", None))]));
        let strategy = RemoteStrategy::new(api, fallback());
        assert!(strategy.probe().await);
        assert!(strategy.is_available());
    }
}
