//! Word segmentation and part-of-speech tagging for Thai survey text.
//!
//! Thai runs are segmented by greedy longest dictionary match; characters no
//! dictionary word covers are grouped into a single unknown token. Latin
//! letters and digit runs become their own tokens.

use std::collections::HashSet;

use crate::application::use_cases::text_normalizer::is_thai;
use crate::domain::error::Result;
use crate::domain::lexicon::{Lexicon, PosLexicon};
use crate::domain::survey::PosTag;

pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;
}

pub struct DictionaryTokenizer {
    words: HashSet<String>,
    max_word_chars: usize,
}

impl DictionaryTokenizer {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words: HashSet<String> = words
            .into_iter()
            .map(Into::into)
            .filter(|w: &String| w.chars().any(is_thai))
            .collect();
        let max_word_chars = words.iter().map(|w| w.chars().count()).max().unwrap_or(1);
        Self {
            words,
            max_word_chars,
        }
    }

    pub fn from_lexicon(lexicon: &Lexicon) -> Self {
        Self::new(lexicon.dictionary_words())
    }

    fn segment_thai(&self, run: &[char], tokens: &mut Vec<String>) {
        let mut unknown = String::new();
        let mut i = 0;
        while i < run.len() {
            let longest = (1..=self.max_word_chars.min(run.len() - i))
                .rev()
                .find(|len| {
                    let candidate: String = run[i..i + len].iter().collect();
                    self.words.contains(&candidate)
                });
            match longest {
                Some(len) => {
                    if !unknown.is_empty() {
                        tokens.push(std::mem::take(&mut unknown));
                    }
                    tokens.push(run[i..i + len].iter().collect());
                    i += len;
                }
                None => {
                    unknown.push(run[i]);
                    i += 1;
                }
            }
        }
        if !unknown.is_empty() {
            tokens.push(unknown);
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum RunKind {
    Thai,
    Latin,
    Digit,
}

fn run_kind(c: char) -> Option<RunKind> {
    if is_thai(c) {
        Some(RunKind::Thai)
    } else if c.is_ascii_alphabetic() {
        Some(RunKind::Latin)
    } else if c.is_ascii_digit() {
        Some(RunKind::Digit)
    } else {
        None
    }
}

impl Tokenizer for DictionaryTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let chars: Vec<char> = text.chars().collect();
        let mut tokens = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let Some(kind) = run_kind(chars[start]) else {
                start += 1;
                continue;
            };
            let mut end = start + 1;
            while end < chars.len() && run_kind(chars[end]) == Some(kind) {
                end += 1;
            }
            match kind {
                RunKind::Thai => self.segment_thai(&chars[start..end], &mut tokens),
                RunKind::Latin | RunKind::Digit => tokens.push(chars[start..end].iter().collect()),
            }
            start = end;
        }

        Ok(tokens)
    }
}

/// Part-of-speech lookup backed by the lexicon's word classes.
pub struct PosTagger {
    classes: PosLexicon,
}

impl PosTagger {
    pub fn new(classes: PosLexicon) -> Self {
        Self { classes }
    }

    pub fn tag(&self, word: &str) -> PosTag {
        if self.classes.adj.contains(word) {
            PosTag::Adj
        } else if self.classes.verb.contains(word) {
            PosTag::Verb
        } else if self.classes.noun.contains(word) {
            PosTag::Noun
        } else if self.classes.adv.contains(word) {
            PosTag::Adv
        } else {
            PosTag::Unknown
        }
    }

    pub fn tag_all(&self, tokens: &[String]) -> Vec<(String, PosTag)> {
        tokens
            .iter()
            .map(|token| (token.clone(), self.tag(token)))
            .collect()
    }
}
