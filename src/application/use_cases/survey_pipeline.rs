//! Survey analysis entry point.
//!
//! One call runs as a single sequential task: columns are classified, text
//! cells are classified and mined for keywords in row order, structured
//! columns are aggregated, then the insight phases run one after another.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::use_cases::column_classifier::ColumnClassifier;
use crate::application::use_cases::insight_synthesizer::{InsightSynthesizer, SurveySnapshot};
use crate::application::use_cases::keyword_extractor::{KeywordAccumulator, KeywordExtractor};
use crate::application::use_cases::sentiment::{SentimentEngine, SentimentSession};
use crate::application::use_cases::structured_analyzer::{aggregate_ordinal, tally_choice};
use crate::application::use_cases::text_normalizer::normalize;
use crate::domain::error::Result;
use crate::domain::survey::{
    AnalysisResult, ColumnClassification, ColumnTextSummary, DetailedResult, ResponseTable,
    SampleTexts, SentimentDistribution,
};

/// Sample texts kept per label in a column summary
const COLUMN_SAMPLES_PER_LABEL: usize = 3;
const COLUMN_SAMPLE_CHARS: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineOptions {
    pub keyword_limit: usize,
    /// Positive and negative samples handed to the insight phases
    pub sample_limit: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            keyword_limit: crate::application::use_cases::keyword_extractor::TOP_KEYWORDS,
            sample_limit: 5,
        }
    }
}

pub struct SurveyPipeline {
    engine: Arc<SentimentEngine>,
    classifier: ColumnClassifier,
    keywords: KeywordExtractor,
    synthesizer: InsightSynthesizer,
    options: PipelineOptions,
}

impl SurveyPipeline {
    pub fn new(
        engine: Arc<SentimentEngine>,
        synthesizer: InsightSynthesizer,
        options: PipelineOptions,
    ) -> Self {
        let lexicon = engine.lexicon().clone();
        Self {
            classifier: ColumnClassifier::new(lexicon.clone()),
            keywords: KeywordExtractor::new(lexicon, engine.tokenizer().clone()),
            engine,
            synthesizer,
            options,
        }
    }

    pub fn engine(&self) -> &Arc<SentimentEngine> {
        &self.engine
    }

    /// Analyzes one table. The only error is an engine that was never
    /// initialized; every remote or strategy failure is recovered inside.
    pub async fn analyze(&self, table: &ResponseTable, analysis_id: &str) -> Result<AnalysisResult> {
        let session = self.engine.session()?;
        let strategy = session.strategy_id().describe();
        info!(
            analysis_id,
            rows = table.row_count(),
            columns = table.column_count(),
            strategy = %session.strategy_id(),
            "Starting survey analysis"
        );

        let plan = self.classifier.plan(table);

        let mut accumulator = KeywordAccumulator::new();
        let mut distribution = SentimentDistribution::default();
        let mut detailed_results = Vec::new();
        let mut column_analysis = Vec::new();

        for column in plan.text_columns() {
            let summary = self
                .analyze_text_column(
                    table,
                    column,
                    &session,
                    &mut accumulator,
                    &mut detailed_results,
                )
                .await;
            distribution.positive += summary.sentiment_distribution.positive;
            distribution.neutral += summary.sentiment_distribution.neutral;
            distribution.negative += summary.sentiment_distribution.negative;
            column_analysis.push(summary);
        }

        let ordinal_analysis: Vec<_> = plan
            .ordinal
            .values()
            .filter_map(|column| aggregate_ordinal(table, column))
            .collect();
        let choice_analysis: Vec<_> = plan
            .choice
            .values()
            .map(|column| tally_choice(table, column))
            .collect();

        let top_keywords = accumulator.top(self.options.keyword_limit);
        let snapshot = SurveySnapshot::build(
            table.row_count(),
            distribution,
            &top_keywords,
            &detailed_results,
            &ordinal_analysis,
            &choice_analysis,
            self.options.sample_limit,
        );
        let insights = self.synthesizer.synthesize(&snapshot).await;

        info!(
            analysis_id,
            texts = detailed_results.len(),
            keywords = accumulator.len(),
            ordinal_columns = ordinal_analysis.len(),
            choice_columns = choice_analysis.len(),
            "Survey analysis finished"
        );

        Ok(AnalysisResult {
            analysis_id: analysis_id.to_string(),
            analyzed_at: Utc::now(),
            strategy,
            lexicon_version: self.engine.lexicon().version.clone(),
            total_responses: table.row_count(),
            texts_analyzed: detailed_results.len(),
            sentiment_distribution: distribution,
            top_keywords,
            detailed_results,
            column_analysis,
            ordinal_analysis,
            choice_analysis,
            insights,
        })
    }

    async fn analyze_text_column(
        &self,
        table: &ResponseTable,
        column: &ColumnClassification,
        session: &SentimentSession,
        accumulator: &mut KeywordAccumulator,
        detailed_results: &mut Vec<DetailedResult>,
    ) -> ColumnTextSummary {
        let label = column.label().to_string();
        let mut distribution = SentimentDistribution::default();
        let mut samples = SampleTexts::default();
        let mut keywords_by_category: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

        for (row_index, cell) in table.column(column.column_index).enumerate() {
            let Some(raw) = cell.as_text() else {
                continue;
            };
            if !self.classifier.is_answer(&raw) {
                continue;
            }
            let normalized = normalize(&raw);
            if normalized.is_empty() {
                continue;
            }

            let outcome = session.classify(&normalized).await;
            let fragments = self.keywords.extract(&normalized);
            for fragment in &fragments {
                accumulator.add(fragment, &label);
                *keywords_by_category
                    .entry(fragment.category.clone())
                    .or_default()
                    .entry(fragment.word.clone())
                    .or_insert(0) += 1;
            }

            distribution.record(outcome.label);
            let bucket = samples.bucket_mut(outcome.label);
            if bucket.len() < COLUMN_SAMPLES_PER_LABEL {
                bucket.push(raw.chars().take(COLUMN_SAMPLE_CHARS).collect());
            }

            detailed_results.push(DetailedResult {
                column: label.clone(),
                row_index,
                text: raw,
                normalized_text: normalized,
                sentiment: outcome.label,
                confidence: outcome.confidence,
                keywords: fragments,
                evidence: outcome.evidence,
            });
        }

        ColumnTextSummary {
            label,
            column_index: column.column_index,
            total_texts: distribution.total(),
            sentiment_distribution: distribution,
            sample_texts: samples,
            keywords_by_category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::application::use_cases::insight_synthesizer::{GenerationCascade, PromptTemplates};
    use crate::application::use_cases::sentiment::remote::tests::ScriptedApi;
    use crate::application::use_cases::tokenizer::DictionaryTokenizer;
    use crate::domain::error::AppError;
    use crate::domain::lexicon::Lexicon;
    use crate::domain::strategy::StrategyId;
    use crate::domain::survey::{AnalysisMethod, SentimentLabel};
    use crate::infrastructure::config::CorpusSettings;
    use crate::infrastructure::llm_clients::GeminiClient;

    fn pipeline() -> SurveyPipeline {
        let lexicon = Arc::new(Lexicon::embedded().unwrap());
        let tokenizer = Arc::new(DictionaryTokenizer::from_lexicon(&lexicon));
        let engine = Arc::new(SentimentEngine::new(
            lexicon.clone(),
            tokenizer,
            Arc::new(ScriptedApi::unavailable()),
            CorpusSettings {
                path: None,
                min_examples: 50,
                neighbors: 1,
                write_bootstrap: false,
            },
        ));
        // No model profiles: every phase uses its rule-based output
        let synthesizer = InsightSynthesizer::new(
            GenerationCascade::new(Arc::new(GeminiClient::new()), Vec::new(), Duration::ZERO),
            Arc::new(PromptTemplates::embedded().unwrap()),
            lexicon.insight.clone(),
        );
        SurveyPipeline::new(engine, synthesizer, PipelineOptions::default())
    }

    fn table() -> ResponseTable {
        let rows = [
            ["2024-01-01", "ใช้งานง่าย สะดวกมาก", "4", "สนใจ"],
            ["2024-01-02", "ระบบช้า สับสนมาก", "5", "สนใจ"],
            ["2024-01-03", "-", "3", "ไม่สนใจ"],
            ["2024-01-04", "ไม่สับสนเลย ดีมาก", "4", "สนใจ"],
        ];
        ResponseTable::from_strings(
            vec![
                "ประทับเวลา".to_string(),
                "สิ่งที่ต้องการให้ปรับปรุง".to_string(),
                "ความพึงพอใจโดยรวม".to_string(),
                "สนใจทดสอบอีกครั้งหรือไม่".to_string(),
            ],
            rows.iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        )
    }

    #[tokio::test]
    async fn uninitialized_engine_is_terminal() {
        let pipeline = pipeline();
        let err = pipeline.analyze(&table(), "a-1").await.unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn analyzes_text_scale_and_choice_columns() {
        let pipeline = pipeline();
        pipeline.engine().initialize(StrategyId::Lexicon).await;
        let result = pipeline.analyze(&table(), "a-1").await.unwrap();

        assert_eq!(result.analysis_id, "a-1");
        assert_eq!(result.total_responses, 4);
        assert_eq!(result.texts_analyzed, 3);
        assert_eq!(result.sentiment_distribution, SentimentDistribution::new(2, 0, 1));

        let rows: Vec<usize> = result.detailed_results.iter().map(|r| r.row_index).collect();
        assert_eq!(rows, vec![0, 1, 3]);
        assert_eq!(result.detailed_results[2].sentiment, SentimentLabel::Positive);
        assert!(result
            .detailed_results
            .iter()
            .all(|r| r.column == "สิ่งที่ต้องการให้ปรับปรุง"));

        assert_eq!(result.column_analysis.len(), 1);
        assert_eq!(result.column_analysis[0].total_texts, 3);
        assert_eq!(result.column_analysis[0].sample_texts.positive.len(), 2);

        assert_eq!(result.ordinal_analysis.len(), 1);
        assert_eq!(result.ordinal_analysis[0].label, "ความง่ายโดยรวม");
        assert!((result.ordinal_analysis[0].mean - 4.0).abs() < 1e-9);
        assert_eq!(result.ordinal_analysis[0].sample_count, 4);

        let interest = result
            .choice_analysis
            .iter()
            .find(|tally| tally.label == "ความสนใจทดสอบอีกครั้ง")
            .unwrap();
        assert_eq!(interest.count_of("สนใจ"), 3);

        assert!(!result.top_keywords.is_empty());
        assert_eq!(
            result.insights.provenance.analysis_method,
            AnalysisMethod::RuleBasedFallback
        );
        assert_eq!(result.insights.sentiment_analysis.overall_mood, "เชิงบวก");
    }

    #[tokio::test]
    async fn table_without_answers_yields_no_data_document() {
        let pipeline = pipeline();
        pipeline.engine().initialize(StrategyId::Lexicon).await;
        let table = ResponseTable::from_strings(
            vec!["ประทับเวลา".to_string()],
            vec![vec!["2024-01-01".to_string()]],
        );
        let result = pipeline.analyze(&table, "empty").await.unwrap();

        assert_eq!(result.texts_analyzed, 0);
        assert_eq!(result.insights.provenance.analysis_method, AnalysisMethod::NoData);
    }
}
