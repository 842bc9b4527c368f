// ============================================================
// STRUCTURED QUESTION AGGREGATES
// ============================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary of one 1..5 rating column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrdinalAggregate {
    /// Derived topic label
    pub label: String,

    pub source_column: usize,

    /// Original header text
    pub column_name: String,

    pub mean: f64,

    /// Population standard deviation; 0 below two samples
    pub std_dev: f64,

    /// Score -> occurrences, ascending by score
    pub value_histogram: BTreeMap<u8, usize>,

    pub sample_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceCount {
    pub value: String,
    pub count: usize,
}

/// Answer counts of one fixed-choice column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceTally {
    pub label: String,

    pub source_column: usize,

    pub column_name: String,

    /// Ordered by count descending, ties by first appearance
    pub counts: Vec<ChoiceCount>,
}

impl ChoiceTally {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn count_of(&self, value: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.count)
            .unwrap_or(0)
    }

    /// Sum of counts whose answer contains `fragment`
    pub fn count_containing(&self, fragment: &str) -> usize {
        self.counts
            .iter()
            .filter(|c| c.value.contains(fragment))
            .map(|c| c.count)
            .sum()
    }
}
