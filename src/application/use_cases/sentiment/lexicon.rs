use std::sync::Arc;

use tracing::warn;

use crate::application::use_cases::tokenizer::Tokenizer;
use crate::domain::lexicon::Lexicon;
use crate::domain::survey::{
    ClassificationMethod, SentimentEvidence, SentimentLabel, SentimentOutcome,
};

const IMPROVEMENT_CONFIDENCE: f64 = 0.6;
const NON_ANSWER_CONFIDENCE: f64 = 0.7;
const UNKNOWN_CONFIDENCE: f64 = 0.5;
const TIE_CONFIDENCE: f64 = 0.6;
const MAJORITY_BASE: f64 = 0.7;
const MAJORITY_STEP: f64 = 0.1;
const MAJORITY_CAP: f64 = 0.9;

/// Word-list classifier. Always available and deterministic.
#[derive(Clone)]
pub struct LexiconStrategy {
    lexicon: Arc<Lexicon>,
    tokenizer: Arc<dyn Tokenizer>,
}

impl LexiconStrategy {
    pub fn new(lexicon: Arc<Lexicon>, tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { lexicon, tokenizer }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn classify(&self, text: &str) -> SentimentOutcome {
        let text = text.to_lowercase();
        let evidence = self.collect_evidence(&text);
        let (label, confidence) = self.decide(&text, &evidence);
        SentimentOutcome {
            label,
            confidence,
            method: ClassificationMethod::RuleBased,
            evidence,
        }
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        match self.tokenizer.tokenize(text) {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(error = %err, "Tokenization failed, using whitespace split");
                text.split_whitespace().map(str::to_string).collect()
            }
        }
    }

    fn collect_evidence(&self, text: &str) -> SentimentEvidence {
        let sentiment = &self.lexicon.sentiment;
        let negation = &sentiment.negation;
        let mut evidence = SentimentEvidence::default();

        if !negation.phrase.is_empty() && text.contains(&negation.phrase) {
            evidence.positive_count += negation.phrase_weight;
            push_unique(&mut evidence.positive_words, &negation.phrase);
        }

        let tokens = self.tokens(text);
        let mut previous: Option<&str> = None;
        for token in &tokens {
            let token = token.as_str();
            // "ไม่ สับสน" split by a space still reads as the negated phrase
            if previous == Some(negation.marker.as_str()) && token == negation.token {
                evidence.positive_count += 1;
                push_unique(&mut evidence.positive_words, &negation.phrase);
            } else if sentiment.positive.contains(token) {
                evidence.positive_count += 1;
                push_unique(&mut evidence.positive_words, token);
            } else if sentiment.negative.contains(token) {
                evidence.negative_count += 1;
                push_unique(&mut evidence.negative_words, token);
            } else if sentiment.neutral.contains(token) {
                evidence.neutral_count += 1;
            }
            previous = Some(token);
        }
        evidence
    }

    fn decide(&self, text: &str, evidence: &SentimentEvidence) -> (SentimentLabel, f64) {
        let sentiment = &self.lexicon.sentiment;
        let counts = [
            (SentimentLabel::Positive, evidence.positive_count),
            (SentimentLabel::Negative, evidence.negative_count),
            (SentimentLabel::Neutral, evidence.neutral_count),
        ];

        if counts.iter().all(|(_, count)| *count == 0) {
            if sentiment.improvement_cues.iter().any(|cue| text.contains(cue.as_str())) {
                return (SentimentLabel::Negative, IMPROVEMENT_CONFIDENCE);
            }
            if sentiment.non_answer_cues.iter().any(|cue| text.contains(cue.as_str())) {
                return (SentimentLabel::Neutral, NON_ANSWER_CONFIDENCE);
            }
            return (SentimentLabel::Neutral, UNKNOWN_CONFIDENCE);
        }

        let mut ranked = counts;
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        let (top_label, top) = ranked[0];
        let runner_up = ranked[1].1;
        if top == runner_up {
            return (SentimentLabel::Neutral, TIE_CONFIDENCE);
        }
        let margin = (top - runner_up) as f64;
        (
            top_label,
            (MAJORITY_BASE + margin * MAJORITY_STEP).min(MAJORITY_CAP),
        )
    }
}

fn push_unique(words: &mut Vec<String>, word: &str) {
    if !words.iter().any(|w| w == word) {
        words.push(word.to_string());
    }
}
