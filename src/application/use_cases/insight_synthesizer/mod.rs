mod cascade;
mod fallback;
mod hashing;
mod llm_output;
mod prompts;
mod snapshot;
mod types;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::domain::error::AppError;
use crate::domain::lexicon::InsightCues;
use crate::domain::survey::{
    AnalysisMethod, InsightDocument, InsightPhase, InsightProvenance, SectionProvenance,
    SectionSource,
};

pub use cascade::{Generation, GenerationCascade};
pub use prompts::PromptTemplates;
pub use snapshot::{ScoreSummary, SurveySnapshot};
pub use types::{NegativePhase, PositivePhase, RecommendationPhase, SentimentPhase, SummaryPhase};

use llm_output::parse_phase;

/// Five sequential generation phases over a survey snapshot. Each phase
/// falls back to its rule-based output when the remote answer is unusable,
/// so synthesis itself never fails.
pub struct InsightSynthesizer {
    cascade: GenerationCascade,
    prompts: Arc<PromptTemplates>,
    cues: InsightCues,
}

impl InsightSynthesizer {
    pub fn new(cascade: GenerationCascade, prompts: Arc<PromptTemplates>, cues: InsightCues) -> Self {
        Self {
            cascade,
            prompts,
            cues,
        }
    }

    pub fn prompt_version(&self) -> &str {
        &self.prompts.version
    }

    pub async fn synthesize(&self, snapshot: &SurveySnapshot) -> InsightDocument {
        let input_digest = hashing::digest(snapshot).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to hash insight input");
            String::new()
        });

        if snapshot.total() == 0 {
            let reason = AppError::InputEmpty("No analyzed texts".to_string());
            tracing::info!(reason = %reason, "Skipping insight synthesis");
            return fallback::no_data(&self.prompts.version, input_digest);
        }

        let mut sections = Vec::with_capacity(InsightPhase::ALL.len());

        let sentiment: SentimentPhase = self
            .run_phase(
                InsightPhase::SentimentSummary,
                self.prompts.sentiment_prompt(snapshot),
                &mut sections,
                || fallback::sentiment(snapshot),
            )
            .await;

        let positive: PositivePhase = self
            .run_phase(
                InsightPhase::PositiveAspects,
                self.prompts.positive_prompt(snapshot, &self.cues),
                &mut sections,
                || fallback::positive(snapshot, &self.cues),
            )
            .await;

        let negative: NegativePhase = self
            .run_phase(
                InsightPhase::NegativeAspects,
                self.prompts.negative_prompt(snapshot, &self.cues),
                &mut sections,
                || fallback::negative(snapshot, &self.cues),
            )
            .await;

        let recommendations: RecommendationPhase = self
            .run_phase(
                InsightPhase::Recommendations,
                self.prompts
                    .recommendation_prompt(&sentiment, &positive, &negative),
                &mut sections,
                || fallback::recommendations(&negative, &self.cues),
            )
            .await;

        let summary: SummaryPhase = self
            .run_phase(
                InsightPhase::ExecutiveSummary,
                self.prompts.summary_prompt(
                    snapshot,
                    &sentiment,
                    &positive,
                    &negative,
                    &recommendations,
                ),
                &mut sections,
                || fallback::summary(snapshot),
            )
            .await;

        let remote_sections = sections
            .iter()
            .filter(|section| section.source == SectionSource::Remote)
            .count();
        let analysis_method = match remote_sections {
            0 => AnalysisMethod::RuleBasedFallback,
            n if n == sections.len() => AnalysisMethod::RemoteMultiStep,
            _ => AnalysisMethod::Mixed,
        };
        tracing::info!(
            remote_sections,
            method = ?analysis_method,
            "Insight synthesis finished"
        );

        InsightDocument {
            executive_summary: summary.executive_summary,
            positive_aspects: positive.positive_aspects,
            negative_aspects: negative.negative_aspects,
            recommendations: dedup(recommendations.recommendations),
            system_strengths: positive.system_strengths,
            improvement_areas: negative.improvement_areas,
            user_pain_points: negative.user_pain_points,
            priority_actions: recommendations.priority_actions,
            sentiment_analysis: sentiment.sentiment_analysis,
            provenance: InsightProvenance {
                ai_generated: remote_sections > 0,
                analysis_method,
                steps_completed: sections.len() as u8,
                data_points_analyzed: snapshot.data_points(),
                prompt_version: self.prompts.version.clone(),
                input_digest,
                sections,
            },
        }
    }

    async fn run_phase<T, F>(
        &self,
        phase: InsightPhase,
        prompt: String,
        sections: &mut Vec<SectionProvenance>,
        rule_based: F,
    ) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let attempt = match self.cascade.generate(&prompt).await {
            Ok(generation) => parse_phase::<T>(&generation.text, phase.expected_keys())
                .map(|parsed| (parsed, generation.model)),
            Err(err) => Err(err),
        };

        match attempt {
            Ok((parsed, model)) => {
                tracing::debug!(step = phase.step(), model = %model, "Phase answered remotely");
                sections.push(SectionProvenance {
                    phase,
                    source: SectionSource::Remote,
                    model: Some(model),
                });
                parsed
            }
            Err(err) => {
                tracing::warn!(step = phase.step(), error = %err, "Phase using rule-based output");
                sections.push(SectionProvenance {
                    phase,
                    source: SectionSource::Fallback,
                    model: None,
                });
                rule_based()
            }
        }
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}
