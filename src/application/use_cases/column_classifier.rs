//! Column classification for survey tables.
//!
//! Three passes run over every column independently:
//! - free-text pass: `text` or `skip`
//! - ordinal pass: 1..5 rating scales
//! - choice pass: small enumerable answer sets that are not ratings
//!
//! A column may appear in more than one view.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::application::use_cases::text_normalizer::has_thai;
use crate::domain::lexicon::{first_topic, ColumnRules, Lexicon};
use crate::domain::survey::{Cell, ColumnClassification, ColumnKind, ColumnPlan, ResponseTable};

/// Non-empty values inspected per column by the free-text pass
pub const TEXT_SAMPLE_SIZE: usize = 20;

/// Minimum share of free-text-looking samples for a `text` column
pub const TEXT_SHARE_THRESHOLD: f64 = 0.3;

const MAX_BINARY_CHOICE_VALUES: usize = 3;
const MAX_ORDINAL_DISTINCT: usize = 5;
const MIN_CHOICE_DISTINCT: usize = 2;
const MAX_CHOICE_DISTINCT: usize = 10;
const SCALE_ANSWERS: [&str; 5] = ["1.0", "2.0", "3.0", "4.0", "5.0"];

pub struct ColumnClassifier {
    lexicon: Arc<Lexicon>,
}

impl ColumnClassifier {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    fn rules(&self) -> &ColumnRules {
        &self.lexicon.columns
    }

    /// One classification per column (text, then ordinal, then choice).
    pub fn classify(&self, table: &ResponseTable) -> BTreeMap<usize, ColumnClassification> {
        self.plan(table).primary()
    }

    /// All three views over the table.
    pub fn plan(&self, table: &ResponseTable) -> ColumnPlan {
        let mut plan = ColumnPlan::default();

        for (index, header) in table.headers.iter().enumerate() {
            let text = self.classify_text_column(table, index, header);
            debug!(
                column = index,
                header = %header,
                kind = ?text.kind,
                "Free-text pass"
            );
            plan.text.insert(index, text);

            if let Some(ordinal) = self.classify_ordinal_column(table, index, header) {
                plan.ordinal.insert(index, ordinal);
            }
            if let Some(choice) = self.classify_choice_column(table, index, header) {
                plan.choice.insert(index, choice);
            }
        }

        plan
    }

    /// Free-text pass for one column.
    pub fn classify_text_column(
        &self,
        table: &ResponseTable,
        index: usize,
        header: &str,
    ) -> ColumnClassification {
        let rules = self.rules();
        let header_lower = header.to_lowercase();

        if contains_any(&header_lower, &rules.metadata_keywords) {
            return ColumnClassification::skip(index, header);
        }

        let sample: Vec<String> = table
            .column(index)
            .filter_map(Cell::as_text)
            .take(TEXT_SAMPLE_SIZE)
            .collect();
        if sample.is_empty() {
            return ColumnClassification::skip(index, header);
        }

        let distinct: HashSet<&str> = sample.iter().map(|v| v.trim()).collect();
        if distinct.len() <= MAX_BINARY_CHOICE_VALUES
            && distinct
                .iter()
                .any(|value| rules.binary_choice_values.contains(*value))
        {
            return ColumnClassification::skip(index, header);
        }

        let qualifying = sample
            .iter()
            .filter(|value| self.looks_like_comment(value))
            .count();
        let required = (sample.len() as f64 * TEXT_SHARE_THRESHOLD).max(1.0);
        if (qualifying as f64) < required {
            return ColumnClassification::skip(index, header);
        }

        match first_topic(&rules.text_rules, header) {
            Some(label) => {
                ColumnClassification::labeled(index, header, ColumnKind::Text, label.to_string())
            }
            None if qualifying >= rules.min_generated_text_samples => {
                ColumnClassification::labeled(
                    index,
                    header,
                    ColumnKind::Text,
                    format!("{}{}", rules.text_prefix, header),
                )
            }
            None => ColumnClassification::skip(index, header),
        }
    }

    /// Ordinal pass for one column; `None` when the column is not a 1..5 scale.
    pub fn classify_ordinal_column(
        &self,
        table: &ResponseTable,
        index: usize,
        header: &str,
    ) -> Option<ColumnClassification> {
        let rules = self.rules();
        if contains_any(&header.to_lowercase(), &rules.ordinal_skip_keywords) {
            return None;
        }
        if !is_ordinal_scale(&table.column_numbers(index)) {
            return None;
        }

        let label = first_topic(&rules.ordinal_rules, header)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}{}", rules.ordinal_prefix, header));
        Some(ColumnClassification::labeled(
            index,
            header,
            ColumnKind::OrdinalScale,
            label,
        ))
    }

    /// Choice pass for one column; `None` unless 2..=10 distinct answers and
    /// the ordinal pass did not claim the column.
    pub fn classify_choice_column(
        &self,
        table: &ResponseTable,
        index: usize,
        header: &str,
    ) -> Option<ColumnClassification> {
        let rules = self.rules();
        if contains_any(&header.to_lowercase(), &rules.choice_skip_keywords) {
            return None;
        }

        let values = table.column_texts(index);
        let distinct: HashSet<&str> = values.iter().map(|v| v.trim()).collect();
        if !(MIN_CHOICE_DISTINCT..=MAX_CHOICE_DISTINCT).contains(&distinct.len()) {
            return None;
        }
        if self.classify_ordinal_column(table, index, header).is_some() {
            return None;
        }

        let label = first_topic(&rules.choice_rules, header)
            .map(str::to_string)
            .unwrap_or_else(|| format!("{}{}", rules.choice_prefix, header));
        Some(ColumnClassification::labeled(
            index,
            header,
            ColumnKind::FixedChoice,
            label,
        ))
    }

    /// Whether a sampled value reads like a genuine free-text comment.
    fn looks_like_comment(&self, value: &str) -> bool {
        let rules = self.rules();
        let trimmed = value.trim();
        if !self.is_answer(trimmed) || SCALE_ANSWERS.contains(&trimmed) {
            return false;
        }
        if rules
            .choice_phrases
            .iter()
            .any(|phrase| trimmed.contains(phrase.as_str()))
        {
            return false;
        }
        has_thai(trimmed) && trimmed.chars().count() > 3
    }

    /// Cell filter applied before sentiment classification: rejects blanks,
    /// short strings, known non-answers and bare numbers.
    pub fn is_answer(&self, value: &str) -> bool {
        let trimmed = value.trim();
        !trimmed.is_empty()
            && trimmed.chars().count() > 2
            && !self.rules().non_answers.contains(trimmed)
            && !trimmed.chars().all(|c| c.is_ascii_digit())
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|needle| haystack.contains(needle.as_str()))
}

/// Non-empty, at most five distinct values, all integers in 1..=5.
pub fn is_ordinal_scale(values: &[f64]) -> bool {
    if values.is_empty() {
        return false;
    }
    let mut distinct: Vec<f64> = Vec::new();
    for value in values {
        if value.fract() != 0.0 || !(1.0..=5.0).contains(value) {
            return false;
        }
        if !distinct.contains(value) {
            distinct.push(*value);
        }
    }
    distinct.len() <= MAX_ORDINAL_DISTINCT
}
