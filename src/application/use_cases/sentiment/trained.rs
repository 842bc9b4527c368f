//! Compression-distance nearest-neighbor classifier.
//!
//! Distance between two texts is the normalized compression distance over
//! gzip output lengths: `(C(ab) - min(C(a), C(b))) / max(C(a), C(b))` with
//! `ab` the two texts joined by a space.

use std::cmp::Ordering;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use flate2::write::GzEncoder;
use flate2::Compression;
use tracing::{info, warn};

use super::corpus::TrainingCorpus;
use super::lexicon::LexiconStrategy;
use crate::domain::error::{AppError, Result};
use crate::domain::survey::{ClassificationMethod, SentimentLabel, SentimentOutcome};

fn compressed_len(text: &str) -> Result<usize> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    Ok(encoder.finish()?.len())
}

struct FittedExample {
    text: String,
    label: SentimentLabel,
    compressed: usize,
}

pub struct CompressionModel {
    examples: Vec<FittedExample>,
    neighbors: usize,
}

impl CompressionModel {
    pub fn fit(corpus: &TrainingCorpus, neighbors: usize) -> Result<Self> {
        if corpus.is_empty() {
            return Err(AppError::ClassificationUnavailable(
                "Training corpus is empty".to_string(),
            ));
        }
        let examples = corpus
            .examples()
            .iter()
            .map(|example| {
                Ok(FittedExample {
                    compressed: compressed_len(&example.text)?,
                    text: example.text.clone(),
                    label: example.label,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            examples,
            neighbors: neighbors.max(1),
        })
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Label by majority of the k nearest examples; a tied vote goes to the
    /// label of the nearest example among the tied labels. Confidence is
    /// `1 - distance` to the nearest example.
    pub fn predict(&self, text: &str) -> Result<(SentimentLabel, f64)> {
        let compressed = compressed_len(text)?;
        let mut distances = Vec::with_capacity(self.examples.len());
        for example in &self.examples {
            let combined = compressed_len(&format!("{} {}", text, example.text))?;
            let smaller = compressed.min(example.compressed);
            let larger = compressed.max(example.compressed).max(1);
            let distance = combined.saturating_sub(smaller) as f64 / larger as f64;
            distances.push((distance, example.label));
        }
        distances.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let nearest = distances
            .first()
            .copied()
            .ok_or_else(|| AppError::ClassificationUnavailable("Model has no examples".to_string()))?;
        let votes = &distances[..self.neighbors.min(distances.len())];

        let count = |label: SentimentLabel| votes.iter().filter(|(_, l)| *l == label).count();
        let best = SentimentLabel::ALL.iter().map(|l| count(*l)).max().unwrap_or(0);
        let label = votes
            .iter()
            .map(|(_, label)| *label)
            .find(|label| count(*label) == best)
            .unwrap_or(nearest.1);

        Ok((label, (1.0 - nearest.0).clamp(0.0, 1.0)))
    }
}

/// Nearest-neighbor strategy with a permanent switch to the lexicon after
/// the first fitting or inference failure.
pub struct TrainedStrategy {
    model: Option<CompressionModel>,
    degraded: AtomicBool,
    fallback: LexiconStrategy,
}

impl TrainedStrategy {
    pub fn new(model: Option<CompressionModel>, fallback: LexiconStrategy) -> Self {
        Self {
            model,
            degraded: AtomicBool::new(false),
            fallback,
        }
    }

    pub fn train(corpus: Result<TrainingCorpus>, neighbors: usize, fallback: LexiconStrategy) -> Self {
        let model = corpus.and_then(|corpus| CompressionModel::fit(&corpus, neighbors));
        match model {
            Ok(model) => {
                info!(examples = model.len(), neighbors, "Compression model trained");
                Self::new(Some(model), fallback)
            }
            Err(err) => {
                warn!(error = %err, "Compression model unavailable, using rule-based fallback");
                Self::new(None, fallback)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some() && !self.degraded.load(AtomicOrdering::Relaxed)
    }

    pub fn training_examples(&self) -> usize {
        self.model.as_ref().map(CompressionModel::len).unwrap_or(0)
    }

    fn predict(&self, text: &str) -> Result<(SentimentLabel, f64)> {
        if self.degraded.load(AtomicOrdering::Relaxed) {
            return Err(AppError::ClassificationUnavailable(
                "Compression model degraded".to_string(),
            ));
        }
        self.model
            .as_ref()
            .ok_or_else(|| AppError::ClassificationUnavailable("Model never fit".to_string()))?
            .predict(text)
    }

    pub fn classify(&self, text: &str) -> SentimentOutcome {
        let lexical = self.fallback.classify(text);
        match self.predict(text) {
            Ok((label, confidence)) => SentimentOutcome {
                label,
                confidence,
                method: ClassificationMethod::Trained,
                evidence: lexical.evidence,
            },
            Err(err) => {
                if self.model.is_some() && !self.degraded.swap(true, AtomicOrdering::Relaxed) {
                    warn!(error = %err, "Compression model failed, degrading to rule-based");
                }
                SentimentOutcome {
                    method: ClassificationMethod::TrainedFallback,
                    ..lexical
                }
            }
        }
    }
}
