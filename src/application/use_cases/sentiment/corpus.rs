//! Labeled training corpus for the compression nearest-neighbor strategy.
//!
//! Layout: one directory holding `positive.txt`, `negative.txt` and
//! `neutral.txt`, one example per line. Blank lines and `#` comments are
//! ignored.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::error::Result;
use crate::domain::lexicon::BootstrapCorpus;
use crate::domain::survey::SentimentLabel;
use crate::infrastructure::config::CorpusSettings;
use crate::infrastructure::storage::ensure_corpus_dir;

pub fn corpus_file(label: SentimentLabel) -> &'static str {
    match label {
        SentimentLabel::Positive => "positive.txt",
        SentimentLabel::Neutral => "neutral.txt",
        SentimentLabel::Negative => "negative.txt",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledText {
    pub text: String,
    pub label: SentimentLabel,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingCorpus {
    examples: Vec<LabeledText>,
}

impl TrainingCorpus {
    pub fn load(dir: &Path) -> Result<Self> {
        let mut corpus = Self::default();
        for label in SentimentLabel::ALL {
            let path = dir.join(corpus_file(label));
            if !path.exists() {
                debug!(path = %path.display(), "Corpus file missing");
                continue;
            }
            let content = fs::read_to_string(&path)?;
            corpus.examples.extend(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty() && !line.starts_with('#'))
                    .map(|line| LabeledText {
                        text: line.to_string(),
                        label,
                    }),
            );
        }
        Ok(corpus)
    }

    pub fn bootstrap(seed: &BootstrapCorpus) -> Self {
        let mut corpus = Self::default();
        for label in SentimentLabel::ALL {
            corpus
                .examples
                .extend(seed_lines(seed, label).iter().map(|text| LabeledText {
                    text: text.clone(),
                    label,
                }));
        }
        corpus
    }

    /// Writes bootstrap files for labels whose file does not exist yet.
    /// Returns how many files were written.
    pub fn write_bootstrap(dir: &Path, seed: &BootstrapCorpus) -> Result<usize> {
        ensure_corpus_dir(dir)?;
        let mut written = 0;
        for label in SentimentLabel::ALL {
            let path = dir.join(corpus_file(label));
            if path.exists() {
                continue;
            }
            let mut content = seed_lines(seed, label).join("\n");
            content.push('\n');
            fs::write(&path, content)?;
            info!(path = %path.display(), "Wrote bootstrap corpus file");
            written += 1;
        }
        Ok(written)
    }

    /// Loads the configured corpus, topping it up with bootstrap examples
    /// when it holds fewer than `min_examples`. An unwritable or unreadable
    /// corpus directory counts as an empty corpus.
    pub fn prepare(settings: &CorpusSettings, seed: &BootstrapCorpus) -> Result<Self> {
        let mut corpus = match &settings.path {
            Some(dir) => {
                if settings.write_bootstrap {
                    if let Err(err) = Self::write_bootstrap(dir, seed) {
                        warn!(path = %dir.display(), error = %err, "Could not write bootstrap corpus");
                    }
                }
                Self::load(dir).unwrap_or_else(|err| {
                    warn!(path = %dir.display(), error = %err, "Could not read corpus, using bootstrap examples");
                    Self::default()
                })
            }
            None => Self::default(),
        };

        if corpus.len() < settings.min_examples {
            info!(
                examples = corpus.len(),
                min_examples = settings.min_examples,
                "Corpus too small, appending bootstrap examples"
            );
            corpus.extend(Self::bootstrap(seed));
        }
        Ok(corpus)
    }

    pub fn extend(&mut self, other: TrainingCorpus) {
        self.examples.extend(other.examples);
    }

    pub fn examples(&self) -> &[LabeledText] {
        &self.examples
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn count(&self, label: SentimentLabel) -> usize {
        self.examples.iter().filter(|e| e.label == label).count()
    }
}

fn seed_lines(seed: &BootstrapCorpus, label: SentimentLabel) -> &[String] {
    match label {
        SentimentLabel::Positive => &seed.positive,
        SentimentLabel::Neutral => &seed.neutral,
        SentimentLabel::Negative => &seed.negative,
    }
}
