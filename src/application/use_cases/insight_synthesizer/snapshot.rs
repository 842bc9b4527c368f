use serde::{Deserialize, Serialize};

use crate::domain::survey::{
    ChoiceTally, DetailedResult, KeywordSummary, OrdinalAggregate, SentimentDistribution,
    SentimentLabel,
};

/// Keywords handed to the phases
pub const SNAPSHOT_KEYWORDS: usize = 10;
pub const HIGH_SCORE: f64 = 4.0;
pub const LOW_SCORE: f64 = 3.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub label: String,
    pub mean: f64,
}

/// Aggregates every synthesis phase reads. Prompts and fallbacks are
/// functions of this value only, plus earlier phase outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveySnapshot {
    pub respondents: usize,
    pub distribution: SentimentDistribution,
    pub top_keywords: Vec<String>,
    pub positive_samples: Vec<String>,
    pub negative_samples: Vec<String>,
    pub scores: Vec<ScoreSummary>,
    pub choices: Vec<ChoiceTally>,
}

impl SurveySnapshot {
    pub fn build(
        respondents: usize,
        distribution: SentimentDistribution,
        keywords: &[KeywordSummary],
        detailed: &[DetailedResult],
        ordinal: &[OrdinalAggregate],
        choices: &[ChoiceTally],
        sample_limit: usize,
    ) -> Self {
        let samples = |label: SentimentLabel| -> Vec<String> {
            detailed
                .iter()
                .filter(|result| result.sentiment == label)
                .map(|result| result.text.clone())
                .take(sample_limit)
                .collect()
        };

        Self {
            respondents,
            distribution,
            top_keywords: keywords
                .iter()
                .take(SNAPSHOT_KEYWORDS)
                .map(|keyword| keyword.word.clone())
                .collect(),
            positive_samples: samples(SentimentLabel::Positive),
            negative_samples: samples(SentimentLabel::Negative),
            scores: ordinal
                .iter()
                .map(|aggregate| ScoreSummary {
                    label: aggregate.label.clone(),
                    mean: aggregate.mean,
                })
                .collect(),
            choices: choices.to_vec(),
        }
    }

    pub fn total(&self) -> usize {
        self.distribution.total()
    }

    pub fn positive_rate(&self) -> f64 {
        self.distribution.positive_rate()
    }

    pub fn high_scores(&self) -> Vec<&ScoreSummary> {
        self.scores.iter().filter(|s| s.mean >= HIGH_SCORE).collect()
    }

    pub fn low_scores(&self) -> Vec<&ScoreSummary> {
        self.scores.iter().filter(|s| s.mean < LOW_SCORE).collect()
    }

    pub fn data_points(&self) -> usize {
        self.top_keywords.len()
            + self.positive_samples.len()
            + self.negative_samples.len()
            + self.scores.len()
            + self.total()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::survey::SentimentEvidence;
    use std::collections::BTreeMap;

    fn detailed(text: &str, sentiment: SentimentLabel) -> DetailedResult {
        DetailedResult {
            column: "c".to_string(),
            row_index: 0,
            text: text.to_string(),
            normalized_text: text.to_string(),
            sentiment,
            confidence: 0.8,
            keywords: Vec::new(),
            evidence: SentimentEvidence::default(),
        }
    }

    fn aggregate(label: &str, mean: f64) -> OrdinalAggregate {
        OrdinalAggregate {
            label: label.to_string(),
            source_column: 0,
            column_name: label.to_string(),
            mean,
            std_dev: 0.0,
            value_histogram: BTreeMap::new(),
            sample_count: 1,
        }
    }

    #[test]
    fn samples_are_capped_per_label_in_row_order() {
        let results: Vec<DetailedResult> = (0..8)
            .map(|i| detailed(&format!("ดี {}", i), SentimentLabel::Positive))
            .chain(std::iter::once(detailed("ช้า", SentimentLabel::Negative)))
            .collect();
        let snapshot = SurveySnapshot::build(
            9,
            SentimentDistribution::new(8, 0, 1),
            &[],
            &results,
            &[],
            &[],
            5,
        );
        assert_eq!(snapshot.positive_samples.len(), 5);
        assert_eq!(snapshot.positive_samples[0], "ดี 0");
        assert_eq!(snapshot.negative_samples, vec!["ช้า".to_string()]);
        assert_eq!(snapshot.data_points(), 5 + 1 + 9);
    }

    #[test]
    fn score_thresholds() {
        let snapshot = SurveySnapshot::build(
            3,
            SentimentDistribution::default(),
            &[],
            &[],
            &[aggregate("a", 4.0), aggregate("b", 3.5), aggregate("c", 3.49)],
            &[],
            5,
        );
        let high: Vec<&str> = snapshot.high_scores().iter().map(|s| s.label.as_str()).collect();
        let low: Vec<&str> = snapshot.low_scores().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(high, vec!["a"]);
        assert_eq!(low, vec!["c"]);
    }
}
