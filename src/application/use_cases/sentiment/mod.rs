//! Sentiment classification engine.
//!
//! Exactly one strategy is active at a time. Each analysis takes a
//! [`SentimentSession`], an `Arc` snapshot of the strategy active when the
//! analysis started, so a concurrent `set_strategy` never changes labels
//! halfway through a table.

pub mod corpus;
pub mod lexicon;
pub mod remote;
pub mod trained;

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use crate::application::use_cases::tokenizer::Tokenizer;
use crate::domain::error::{AppError, Result};
use crate::domain::lexicon::Lexicon;
use crate::domain::strategy::{StrategyDescription, StrategyId, StrategyInfo};
use crate::domain::survey::SentimentOutcome;
use crate::infrastructure::config::CorpusSettings;
use crate::infrastructure::sentiment_api::SentimentApiClient;

pub use corpus::TrainingCorpus;
pub use lexicon::LexiconStrategy;
pub use remote::RemoteStrategy;
pub use trained::{CompressionModel, TrainedStrategy};

pub enum ActiveStrategy {
    Lexicon(LexiconStrategy),
    Trained(TrainedStrategy),
    Remote(RemoteStrategy),
}

impl ActiveStrategy {
    pub fn id(&self) -> StrategyId {
        match self {
            ActiveStrategy::Lexicon(_) => StrategyId::Lexicon,
            ActiveStrategy::Trained(_) => StrategyId::Trained,
            ActiveStrategy::Remote(_) => StrategyId::Remote,
        }
    }

    pub async fn classify(&self, text: &str) -> SentimentOutcome {
        match self {
            ActiveStrategy::Lexicon(strategy) => strategy.classify(text),
            ActiveStrategy::Trained(strategy) => strategy.classify(text),
            ActiveStrategy::Remote(strategy) => strategy.classify(text).await,
        }
    }
}

/// Strategy pinned for the duration of one analysis.
#[derive(Clone)]
pub struct SentimentSession {
    strategy: Arc<ActiveStrategy>,
}

impl SentimentSession {
    pub fn strategy_id(&self) -> StrategyId {
        self.strategy.id()
    }

    pub async fn classify(&self, text: &str) -> SentimentOutcome {
        self.strategy.classify(text).await
    }
}

pub struct SentimentEngine {
    lexicon: Arc<Lexicon>,
    tokenizer: Arc<dyn Tokenizer>,
    api: Arc<dyn SentimentApiClient>,
    corpus: CorpusSettings,
    active: RwLock<Option<Arc<ActiveStrategy>>>,
}

impl SentimentEngine {
    pub fn new(
        lexicon: Arc<Lexicon>,
        tokenizer: Arc<dyn Tokenizer>,
        api: Arc<dyn SentimentApiClient>,
        corpus: CorpusSettings,
    ) -> Self {
        Self {
            lexicon,
            tokenizer,
            api,
            corpus,
            active: RwLock::new(None),
        }
    }

    pub fn lexicon(&self) -> &Arc<Lexicon> {
        &self.lexicon
    }

    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    fn lexicon_strategy(&self) -> LexiconStrategy {
        LexiconStrategy::new(self.lexicon.clone(), self.tokenizer.clone())
    }

    /// Builds strategy state from scratch: retrains the model or re-probes the API.
    async fn build(&self, id: StrategyId) -> ActiveStrategy {
        match id {
            StrategyId::Lexicon => ActiveStrategy::Lexicon(self.lexicon_strategy()),
            StrategyId::Trained => {
                let corpus = TrainingCorpus::prepare(&self.corpus, &self.lexicon.bootstrap);
                ActiveStrategy::Trained(TrainedStrategy::train(
                    corpus,
                    self.corpus.neighbors,
                    self.lexicon_strategy(),
                ))
            }
            StrategyId::Remote => {
                let strategy = RemoteStrategy::new(self.api.clone(), self.lexicon_strategy());
                strategy.probe().await;
                ActiveStrategy::Remote(strategy)
            }
        }
    }

    pub async fn initialize(&self, id: StrategyId) {
        let strategy = Arc::new(self.build(id).await);
        self.install(strategy);
        info!(strategy = %id, "Sentiment engine initialized");
    }

    /// Switches the active strategy. Unknown ids are rejected and leave the
    /// current strategy in place.
    pub async fn set_strategy(&self, id: i32) -> bool {
        let Ok(strategy_id) = StrategyId::try_from(id) else {
            warn!(id, "Unknown sentiment strategy id");
            return false;
        };
        self.initialize(strategy_id).await;
        true
    }

    fn install(&self, strategy: Arc<ActiveStrategy>) {
        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        *active = Some(strategy);
    }

    fn current(&self) -> Option<Arc<ActiveStrategy>> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn session(&self) -> Result<SentimentSession> {
        self.current()
            .map(|strategy| SentimentSession { strategy })
            .ok_or_else(|| {
                AppError::Configuration("Sentiment engine has not been initialized".to_string())
            })
    }

    pub fn get_active_strategy_info(&self) -> Result<StrategyInfo> {
        let strategy = self.session()?.strategy;
        let mut info = StrategyInfo {
            active: strategy.id().describe(),
            lexicon_version: self.lexicon.version.clone(),
            model_trained: None,
            training_examples: None,
            api_available: None,
        };
        match strategy.as_ref() {
            ActiveStrategy::Lexicon(_) => {}
            ActiveStrategy::Trained(trained) => {
                info.model_trained = Some(trained.is_ready());
                info.training_examples = Some(trained.training_examples());
            }
            ActiveStrategy::Remote(remote) => {
                info.api_available = Some(remote.is_available());
            }
        }
        Ok(info)
    }

    pub fn list_strategies() -> Vec<StrategyDescription> {
        StrategyId::ALL.iter().map(|id| id.describe()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::remote::tests::{response, ScriptedApi};
    use super::*;
    use crate::application::use_cases::tokenizer::DictionaryTokenizer;
    use crate::domain::survey::{ClassificationMethod, SentimentLabel};

    fn engine(api: ScriptedApi) -> SentimentEngine {
        let lexicon = Arc::new(Lexicon::embedded().unwrap());
        let tokenizer = Arc::new(DictionaryTokenizer::from_lexicon(&lexicon));
        SentimentEngine::new(
            lexicon,
            tokenizer,
            Arc::new(api),
            CorpusSettings {
                path: None,
                min_examples: 50,
                neighbors: 1,
                write_bootstrap: false,
            },
        )
    }

    #[tokio::test]
    async fn uninitialized_engine_is_a_configuration_error() {
        let engine = engine(ScriptedApi::unavailable());
        assert!(matches!(engine.session(), Err(AppError::Configuration(_))));
        assert!(matches!(
            engine.get_active_strategy_info(),
            Err(AppError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn unknown_strategy_id_leaves_active_strategy_unchanged() {
        let engine = engine(ScriptedApi::unavailable());
        engine.initialize(StrategyId::Lexicon).await;

        assert!(!engine.set_strategy(99).await);
        let info = engine.get_active_strategy_info().unwrap();
        assert_eq!(info.active.strategy, StrategyId::Lexicon);
    }

    #[tokio::test]
    async fn switching_to_trained_fits_from_bootstrap() {
        let engine = engine(ScriptedApi::unavailable());
        engine.initialize(StrategyId::Lexicon).await;

        assert!(engine.set_strategy(1).await);
        let info = engine.get_active_strategy_info().unwrap();
        assert_eq!(info.active.id, 1);
        assert_eq!(info.model_trained, Some(true));
        assert!(info.training_examples.unwrap() > 0);
        assert_eq!(info.api_available, None);
    }

    #[tokio::test]
    async fn remote_switch_reprobes_the_api() {
        let engine = engine(ScriptedApi::new(vec![
            Some(response("neutral", None)),
            Some(response("positive", Some(0.9))),
        ]));
        assert!(engine.set_strategy(2).await);
        assert_eq!(
            engine.get_active_strategy_info().unwrap().api_available,
            Some(true)
        );

        let outcome = engine.session().unwrap().classify("ดีมาก").await;
        assert_eq!(outcome.method, ClassificationMethod::RemoteApi);
        assert_eq!(outcome.label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn session_keeps_strategy_across_switches() {
        let engine = engine(ScriptedApi::unavailable());
        engine.initialize(StrategyId::Lexicon).await;
        let session = engine.session().unwrap();

        assert!(engine.set_strategy(2).await);
        assert_eq!(session.strategy_id(), StrategyId::Lexicon);
        let outcome = session.classify("สับสน").await;
        assert_eq!(outcome.method, ClassificationMethod::RuleBased);
        assert_eq!(engine.session().unwrap().strategy_id(), StrategyId::Remote);
    }

    #[test]
    fn strategies_are_listed_in_id_order() {
        let ids: Vec<i32> = SentimentEngine::list_strategies()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }
}
