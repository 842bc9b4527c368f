use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    ChoiceTally, InsightDocument, KeywordFragment, KeywordSummary, OrdinalAggregate,
    SentimentDistribution, SentimentEvidence, SentimentLabel,
};
use crate::domain::strategy::StrategyDescription;

/// Per-cell outcome of text analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedResult {
    pub column: String,
    pub row_index: usize,
    pub text: String,
    pub normalized_text: String,
    pub sentiment: SentimentLabel,
    pub confidence: f64,
    pub keywords: Vec<KeywordFragment>,
    pub evidence: SentimentEvidence,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleTexts {
    pub positive: Vec<String>,
    pub neutral: Vec<String>,
    pub negative: Vec<String>,
}

impl SampleTexts {
    pub fn bucket_mut(&mut self, label: SentimentLabel) -> &mut Vec<String> {
        match label {
            SentimentLabel::Positive => &mut self.positive,
            SentimentLabel::Neutral => &mut self.neutral,
            SentimentLabel::Negative => &mut self.negative,
        }
    }
}

/// Text-analysis summary of one free-text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTextSummary {
    pub label: String,
    pub column_index: usize,
    pub total_texts: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub sample_texts: SampleTexts,
    /// category -> word -> occurrences
    pub keywords_by_category: BTreeMap<String, BTreeMap<String, usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub analyzed_at: DateTime<Utc>,
    pub strategy: StrategyDescription,
    pub lexicon_version: String,
    pub total_responses: usize,
    pub texts_analyzed: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub top_keywords: Vec<KeywordSummary>,
    pub detailed_results: Vec<DetailedResult>,
    pub column_analysis: Vec<ColumnTextSummary>,
    pub ordinal_analysis: Vec<OrdinalAggregate>,
    pub choice_analysis: Vec<ChoiceTally>,
    pub insights: InsightDocument,
}
