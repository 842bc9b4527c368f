use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::SentimentLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PosTag {
    Adj,
    Verb,
    Noun,
    Adv,
    Unknown,
}

/// One scored token of a single text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordFragment {
    pub word: String,
    pub score: f64,
    pub pos_tag: PosTag,
    pub sentiment_type: SentimentLabel,
    pub category: String,
}

/// Running aggregate of one word across all analyzed texts.
#[derive(Debug, Clone, PartialEq)]
pub struct KeywordRecord {
    pub word: String,
    pub occurrence_count: usize,
    pub cumulative_score: f64,
    pub sentiment_type: SentimentLabel,
    pub category: String,
    pub distinct_columns_seen: BTreeSet<String>,
}

impl KeywordRecord {
    pub fn new(fragment: &KeywordFragment) -> Self {
        Self {
            word: fragment.word.clone(),
            occurrence_count: 0,
            cumulative_score: 0.0,
            sentiment_type: fragment.sentiment_type,
            category: fragment.category.clone(),
            distinct_columns_seen: BTreeSet::new(),
        }
    }

    pub fn observe(&mut self, score: f64, column: &str) {
        self.occurrence_count += 1;
        self.cumulative_score += score;
        if !self.distinct_columns_seen.contains(column) {
            self.distinct_columns_seen.insert(column.to_string());
        }
    }

    pub fn summary(&self) -> KeywordSummary {
        KeywordSummary {
            word: self.word.clone(),
            count: self.occurrence_count,
            avg_score: if self.occurrence_count == 0 {
                0.0
            } else {
                self.cumulative_score / self.occurrence_count as f64
            },
            sentiment_type: self.sentiment_type,
            category: self.category.clone(),
            appears_in_columns: self.distinct_columns_seen.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordSummary {
    pub word: String,
    pub count: usize,
    pub avg_score: f64,
    pub sentiment_type: SentimentLabel,
    pub category: String,
    pub appears_in_columns: usize,
}
