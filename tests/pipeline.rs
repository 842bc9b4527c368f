use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use survey_insight_lib::application::use_cases::insight_synthesizer::{
    GenerationCascade, InsightSynthesizer, PromptTemplates,
};
use survey_insight_lib::application::use_cases::tokenizer::DictionaryTokenizer;
use survey_insight_lib::domain::lexicon::Lexicon;
use survey_insight_lib::domain::llm_config::LLMConfig;
use survey_insight_lib::domain::strategy::StrategyId;
use survey_insight_lib::domain::survey::{
    AnalysisMethod, ClassificationMethod, InsightDocument, SectionSource, SentimentLabel,
};
use survey_insight_lib::infrastructure::config::CorpusSettings;
use survey_insight_lib::infrastructure::llm_clients::LLMClient;
use survey_insight_lib::infrastructure::remote::RemoteFailure;
use survey_insight_lib::infrastructure::sentiment_api::{SentimentApiClient, SentimentApiResponse};
use survey_insight_lib::{PipelineOptions, ResponseTable, SentimentEngine, SurveyPipeline};

struct DownSentimentApi;

#[async_trait]
impl SentimentApiClient for DownSentimentApi {
    async fn analyze(&self, _text: &str) -> Result<SentimentApiResponse, RemoteFailure> {
        Err(RemoteFailure::Status {
            code: 503,
            body: "maintenance".to_string(),
        })
    }
}

#[derive(Default)]
struct DownModel {
    calls: AtomicUsize,
}

#[async_trait]
impl LLMClient for DownModel {
    async fn generate(&self, _config: &LLMConfig, _prompt: &str) -> Result<String, RemoteFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RemoteFailure::Timeout)
    }
}

fn pipeline(model: Arc<DownModel>, corpus: CorpusSettings) -> SurveyPipeline {
    let lexicon = Arc::new(Lexicon::embedded().unwrap());
    let tokenizer = Arc::new(DictionaryTokenizer::from_lexicon(&lexicon));
    let engine = Arc::new(SentimentEngine::new(
        lexicon.clone(),
        tokenizer,
        Arc::new(DownSentimentApi),
        corpus,
    ));
    let profiles = vec![
        LLMConfig {
            model: "primary".to_string(),
            api_key: Some("key".to_string()),
            ..LLMConfig::default()
        },
        LLMConfig {
            model: "secondary".to_string(),
            api_key: Some("key".to_string()),
            ..LLMConfig::default()
        },
    ];
    let synthesizer = InsightSynthesizer::new(
        GenerationCascade::new(model, profiles, Duration::from_millis(1)),
        Arc::new(PromptTemplates::embedded().unwrap()),
        lexicon.insight.clone(),
    );
    SurveyPipeline::new(engine, synthesizer, PipelineOptions::default())
}

fn corpus(path: Option<std::path::PathBuf>) -> CorpusSettings {
    CorpusSettings {
        write_bootstrap: path.is_some(),
        path,
        min_examples: 50,
        neighbors: 1,
    }
}

fn survey() -> ResponseTable {
    let rows = [
        ["2024-03-01 10:00", "ใช้งานง่าย สะดวกมาก ไม่ต้องมาธนาคาร", "5", "สนใจ"],
        ["2024-03-01 10:05", "ระบบช้า สับสนเรื่องวันที่", "2", "ไม่สนใจ"],
        ["2024-03-01 10:10", "ปุ่มแก้ไขเล็ก หายาก", "3", "สนใจ"],
        ["2024-03-01 10:20", "ไม่สับสนเลย เข้าใจง่าย", "4", "สนใจ"],
        ["2024-03-01 10:30", "-", "4", "สนใจ"],
        ["2024-03-01 10:40", "ดีมาก ประทับใจ", "5", "สนใจ"],
    ];
    ResponseTable::from_strings(
        vec![
            "ประทับเวลา".to_string(),
            "สิ่งที่ต้องการให้ปรับปรุง".to_string(),
            "ความพึงพอใจโดยรวม".to_string(),
            "สนใจทดสอบอีกครั้งหรือไม่".to_string(),
        ],
        rows.iter()
            .map(|row| row.iter().map(|value| value.to_string()).collect())
            .collect(),
    )
}

#[tokio::test]
async fn remote_backends_down_still_produce_complete_result() {
    let model = Arc::new(DownModel::default());
    let pipeline = pipeline(model.clone(), corpus(None));
    assert!(pipeline.engine().set_strategy(StrategyId::Remote.code()).await);
    assert_eq!(
        pipeline.engine().get_active_strategy_info().unwrap().api_available,
        Some(false)
    );

    let result = pipeline.analyze(&survey(), "survey-1").await.unwrap();

    assert_eq!(result.total_responses, 6);
    assert_eq!(result.texts_analyzed, 5);
    assert_eq!(result.sentiment_distribution.total(), 5);
    let rows: Vec<usize> = result.detailed_results.iter().map(|r| r.row_index).collect();
    assert_eq!(rows, vec![0, 1, 2, 3, 5]);

    // two models per phase, five phases
    assert_eq!(model.calls.load(Ordering::SeqCst), 10);

    let insights = &result.insights;
    assert_eq!(insights.provenance.analysis_method, AnalysisMethod::RuleBasedFallback);
    assert!(!insights.provenance.ai_generated);
    assert_eq!(insights.provenance.steps_completed, 5);
    assert!(insights
        .provenance
        .sections
        .iter()
        .all(|section| section.source == SectionSource::Fallback));
    assert!(!insights.executive_summary.is_empty());
    assert!(!insights.recommendations.is_empty());
    assert_eq!(insights.priority_actions.len(), 3);

    let json = serde_json::to_value(insights).unwrap();
    for field in InsightDocument::FIELDS {
        assert!(!json[field].is_null(), "{} missing", field);
    }
}

#[tokio::test]
async fn remote_fallback_is_tagged_per_call() {
    let pipeline = pipeline(Arc::new(DownModel::default()), corpus(None));
    pipeline.engine().initialize(StrategyId::Remote).await;

    let result = pipeline.analyze(&survey(), "survey-2").await.unwrap();
    assert_eq!(result.strategy.strategy, StrategyId::Remote);
    let session = pipeline.engine().session().unwrap();
    let outcome = session.classify("ใช้งานง่าย สะดวกมาก").await;
    assert_eq!(outcome.method, ClassificationMethod::RemoteFallback);
    assert_eq!(outcome.label, SentimentLabel::Positive);
}

#[tokio::test]
async fn fallback_insights_are_reproducible() {
    let first = pipeline(Arc::new(DownModel::default()), corpus(None));
    first.engine().initialize(StrategyId::Lexicon).await;
    let second = pipeline(Arc::new(DownModel::default()), corpus(None));
    second.engine().initialize(StrategyId::Lexicon).await;

    let a = first.analyze(&survey(), "a").await.unwrap();
    let b = second.analyze(&survey(), "b").await.unwrap();

    assert_eq!(
        serde_json::to_string(&a.insights).unwrap(),
        serde_json::to_string(&b.insights).unwrap()
    );
    assert_eq!(a.detailed_results, b.detailed_results);
}

#[tokio::test]
async fn trained_strategy_writes_bootstrap_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let corpus_dir = dir.path().join("training");
    let pipeline = pipeline(Arc::new(DownModel::default()), corpus(Some(corpus_dir.clone())));

    assert!(pipeline.engine().set_strategy(1).await);
    for file in ["positive.txt", "neutral.txt", "negative.txt"] {
        assert!(corpus_dir.join(file).is_file(), "{} not written", file);
    }
    let info = pipeline.engine().get_active_strategy_info().unwrap();
    assert_eq!(info.model_trained, Some(true));

    let result = pipeline.analyze(&survey(), "trained").await.unwrap();
    assert_eq!(result.strategy.strategy, StrategyId::Trained);
    assert_eq!(result.texts_analyzed, 5);
    assert!(result
        .detailed_results
        .iter()
        .all(|r| (0.0..=1.0).contains(&r.confidence)));
}

#[tokio::test]
async fn unknown_strategy_keeps_the_current_one() {
    let pipeline = pipeline(Arc::new(DownModel::default()), corpus(None));
    pipeline.engine().initialize(StrategyId::Lexicon).await;

    assert!(!pipeline.engine().set_strategy(99).await);
    assert_eq!(
        pipeline.engine().get_active_strategy_info().unwrap().active.strategy,
        StrategyId::Lexicon
    );
    let names: Vec<i32> = SentimentEngine::list_strategies()
        .iter()
        .map(|description| description.id)
        .collect();
    assert_eq!(names, vec![0, 1, 2]);
}
