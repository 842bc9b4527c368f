use std::collections::HashSet;
use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};

const EMBEDDED_LEXICON: &str = include_str!("../../resources/lexicon.toml");

/// Versioned vocabulary and rule tables shared by every analyzer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Lexicon {
    #[validate(length(min = 1))]
    pub version: String,
    #[validate(nested)]
    pub sentiment: SentimentLexicon,
    pub keywords: KeywordLexicon,
    #[serde(default)]
    pub pos: PosLexicon,
    #[serde(default)]
    pub tokenizer: TokenizerLexicon,
    pub columns: ColumnRules,
    pub insight: InsightCues,
    #[serde(default)]
    pub bootstrap: BootstrapCorpus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SentimentLexicon {
    #[validate(length(min = 1))]
    pub positive: HashSet<String>,
    #[validate(length(min = 1))]
    pub negative: HashSet<String>,
    #[serde(default)]
    pub neutral: HashSet<String>,
    #[serde(default)]
    pub improvement_cues: Vec<String>,
    #[serde(default)]
    pub non_answer_cues: Vec<String>,
    pub negation: NegationRule,
}

/// A literal negated phrase that overrides the bare negative token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NegationRule {
    pub phrase: String,
    pub phrase_weight: usize,
    pub token: String,
    pub marker: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordLexicon {
    pub stopwords: HashSet<String>,
    pub categories: Vec<KeywordCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub name: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PosLexicon {
    #[serde(default)]
    pub adj: HashSet<String>,
    #[serde(default)]
    pub verb: HashSet<String>,
    #[serde(default)]
    pub noun: HashSet<String>,
    #[serde(default)]
    pub adv: HashSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenizerLexicon {
    #[serde(default)]
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnRules {
    pub metadata_keywords: Vec<String>,
    pub ordinal_skip_keywords: Vec<String>,
    pub choice_skip_keywords: Vec<String>,
    pub binary_choice_values: HashSet<String>,
    pub non_answers: HashSet<String>,
    pub choice_phrases: Vec<String>,
    pub text_prefix: String,
    pub ordinal_prefix: String,
    pub choice_prefix: String,
    pub min_generated_text_samples: usize,
    pub text_rules: Vec<TopicRule>,
    pub ordinal_rules: Vec<TopicRule>,
    pub choice_rules: Vec<TopicRule>,
}

/// `(pattern -> label)` row of an ordered topic-naming table.
///
/// Matches when every `all` term and at least one `any` term (if given) occur
/// in the lowercased header and no `none` term does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRule {
    #[serde(default)]
    pub all: Vec<String>,
    #[serde(default)]
    pub any: Vec<String>,
    #[serde(default)]
    pub none: Vec<String>,
    pub label: String,
}

impl TopicRule {
    pub fn matches(&self, header: &str) -> bool {
        self.all.iter().all(|term| header.contains(term.as_str()))
            && (self.any.is_empty() || self.any.iter().any(|term| header.contains(term.as_str())))
            && !self.none.iter().any(|term| header.contains(term.as_str()))
    }
}

/// First matching label, evaluated top to bottom.
pub fn first_topic<'a>(rules: &'a [TopicRule], header: &str) -> Option<&'a str> {
    let lowered = header.to_lowercase();
    rules
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.label.as_str())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightCues {
    pub praise_keywords: Vec<String>,
    pub problem_keywords: Vec<String>,
    pub interest_topic: String,
    pub interest_value: String,
    pub confusion_topic: String,
    pub confusion_value: String,
    #[serde(default)]
    pub pain_points: Vec<PainPointCue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PainPointCue {
    pub cue: String,
    pub pain_point: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BootstrapCorpus {
    #[serde(default)]
    pub positive: Vec<String>,
    #[serde(default)]
    pub negative: Vec<String>,
    #[serde(default)]
    pub neutral: Vec<String>,
}

impl Lexicon {
    /// The vocabulary compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_figment(Figment::from(Toml::string(EMBEDDED_LEXICON)))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AppError::Configuration(format!(
                "Lexicon file not found: {}",
                path.display()
            )));
        }
        Self::from_figment(Figment::from(Toml::file(path)))
    }

    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match override_path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let lexicon: Lexicon = figment
            .extract()
            .map_err(|e| AppError::Configuration(format!("Invalid lexicon: {}", e)))?;
        lexicon
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid lexicon: {}", e)))?;
        Ok(lexicon)
    }

    /// Every word the segmenter should recognize as a unit.
    pub fn dictionary_words(&self) -> Vec<String> {
        let sentiment = &self.sentiment;
        let mut words: Vec<String> = Vec::new();
        words.extend(sentiment.positive.iter().cloned());
        words.extend(sentiment.negative.iter().cloned());
        words.extend(sentiment.neutral.iter().cloned());
        words.extend(sentiment.improvement_cues.iter().cloned());
        words.extend(sentiment.non_answer_cues.iter().cloned());
        words.push(sentiment.negation.phrase.clone());
        words.push(sentiment.negation.token.clone());
        words.push(sentiment.negation.marker.clone());
        words.extend(self.keywords.stopwords.iter().cloned());
        for category in &self.keywords.categories {
            words.extend(category.terms.iter().cloned());
        }
        words.extend(self.pos.adj.iter().cloned());
        words.extend(self.pos.verb.iter().cloned());
        words.extend(self.pos.noun.iter().cloned());
        words.extend(self.pos.adv.iter().cloned());
        words.extend(self.tokenizer.words.iter().cloned());
        words.retain(|word| !word.trim().is_empty());
        words.sort();
        words.dedup();
        words
    }
}
