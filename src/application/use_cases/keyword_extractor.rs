//! Keyword extraction and cross-text keyword aggregation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::warn;

use crate::application::use_cases::tokenizer::{PosTagger, Tokenizer};
use crate::domain::lexicon::Lexicon;
use crate::domain::survey::{
    KeywordFragment, KeywordRecord, KeywordSummary, PosTag, SentimentLabel,
};

/// Fragments kept per text
pub const MAX_FRAGMENTS: usize = 8;

/// Keywords kept in the final ranking
pub const TOP_KEYWORDS: usize = 25;

pub const DEFAULT_CATEGORY: &str = "general";

const BASE_SCORE: f64 = 0.3;
const STRONG_POS_BONUS: f64 = 0.3;
const WEAK_POS_BONUS: f64 = 0.2;
const POLAR_BONUS: f64 = 0.3;
const NEUTRAL_BONUS: f64 = 0.1;
const CATEGORY_BONUS: f64 = 0.2;
const MAX_SCORE: f64 = 1.0;
const FALLBACK_SCORE: f64 = 0.5;
const FALLBACK_WORDS: usize = 3;

pub struct KeywordExtractor {
    lexicon: Arc<Lexicon>,
    tokenizer: Arc<dyn Tokenizer>,
    tagger: PosTagger,
}

impl KeywordExtractor {
    pub fn new(lexicon: Arc<Lexicon>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        let tagger = PosTagger::new(lexicon.pos.clone());
        Self {
            lexicon,
            tokenizer,
            tagger,
        }
    }

    /// Up to eight scored fragments, highest score first.
    pub fn extract(&self, text: &str) -> Vec<KeywordFragment> {
        let tokens = match self.tokenizer.tokenize(text) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(error = %err, "Tokenization failed, using whitespace split");
                return Self::whitespace_fallback(text);
            }
        };

        let mut fragments: Vec<KeywordFragment> = self
            .tagger
            .tag_all(&tokens)
            .into_iter()
            .filter_map(|(word, pos)| self.score(&word, pos))
            .collect();

        fragments.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        fragments.truncate(MAX_FRAGMENTS);
        fragments
    }

    fn score(&self, word: &str, pos_tag: PosTag) -> Option<KeywordFragment> {
        let word = word.trim().to_lowercase();
        if word.chars().count() <= 1
            || word.chars().all(|c| c.is_ascii_digit())
            || self.lexicon.keywords.stopwords.contains(&word)
        {
            return None;
        }

        let mut score = BASE_SCORE;
        score += match pos_tag {
            PosTag::Adj | PosTag::Verb => STRONG_POS_BONUS,
            PosTag::Noun | PosTag::Adv => WEAK_POS_BONUS,
            PosTag::Unknown => 0.0,
        };

        let sentiment = &self.lexicon.sentiment;
        let sentiment_type = if sentiment.positive.contains(&word) {
            score += POLAR_BONUS;
            SentimentLabel::Positive
        } else if sentiment.negative.contains(&word) {
            score += POLAR_BONUS;
            SentimentLabel::Negative
        } else {
            if sentiment.neutral.contains(&word) {
                score += NEUTRAL_BONUS;
            }
            SentimentLabel::Neutral
        };

        let category = self
            .lexicon
            .keywords
            .categories
            .iter()
            .find(|category| {
                category
                    .terms
                    .iter()
                    .any(|term| word.contains(term.as_str()))
            })
            .map(|category| {
                score += CATEGORY_BONUS;
                category.name.clone()
            })
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Some(KeywordFragment {
            word,
            score: score.min(MAX_SCORE),
            pos_tag,
            sentiment_type,
            category,
        })
    }

    fn whitespace_fallback(text: &str) -> Vec<KeywordFragment> {
        text.split_whitespace()
            .take(FALLBACK_WORDS)
            .filter(|word| word.chars().count() > 1)
            .map(|word| KeywordFragment {
                word: word.to_lowercase(),
                score: FALLBACK_SCORE,
                pos_tag: PosTag::Unknown,
                sentiment_type: SentimentLabel::Neutral,
                category: DEFAULT_CATEGORY.to_string(),
            })
            .collect()
    }
}

/// Aggregates fragments across texts in first-seen order.
#[derive(Debug, Default)]
pub struct KeywordAccumulator {
    records: Vec<KeywordRecord>,
    index: HashMap<String, usize>,
}

impl KeywordAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, fragment: &KeywordFragment, column: &str) {
        let position = match self.index.get(&fragment.word) {
            Some(position) => *position,
            None => {
                self.records.push(KeywordRecord::new(fragment));
                self.index
                    .insert(fragment.word.clone(), self.records.len() - 1);
                self.records.len() - 1
            }
        };
        self.records[position].observe(fragment.score, column);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count descending, then cumulative score descending; ties keep first-seen order.
    pub fn top(&self, limit: usize) -> Vec<KeywordSummary> {
        let mut ranked: Vec<&KeywordRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| {
            b.occurrence_count.cmp(&a.occurrence_count).then_with(|| {
                b.cumulative_score
                    .partial_cmp(&a.cumulative_score)
                    .unwrap_or(Ordering::Equal)
            })
        });
        ranked
            .into_iter()
            .take(limit)
            .map(KeywordRecord::summary)
            .collect()
    }
}
