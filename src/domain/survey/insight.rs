// ============================================================
// INSIGHT DOCUMENT
// ============================================================
// Narrative output of the five synthesis phases

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentAnalysis {
    pub overall_mood: String,
    pub satisfaction_level: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightPhase {
    SentimentSummary,
    PositiveAspects,
    NegativeAspects,
    Recommendations,
    ExecutiveSummary,
}

impl InsightPhase {
    /// Execution order
    pub const ALL: [InsightPhase; 5] = [
        InsightPhase::SentimentSummary,
        InsightPhase::PositiveAspects,
        InsightPhase::NegativeAspects,
        InsightPhase::Recommendations,
        InsightPhase::ExecutiveSummary,
    ];

    pub fn step(self) -> u8 {
        match self {
            InsightPhase::SentimentSummary => 1,
            InsightPhase::PositiveAspects => 2,
            InsightPhase::NegativeAspects => 3,
            InsightPhase::Recommendations => 4,
            InsightPhase::ExecutiveSummary => 5,
        }
    }

    /// Top-level keys a remote answer must carry to be accepted
    pub fn expected_keys(self) -> &'static [&'static str] {
        match self {
            InsightPhase::SentimentSummary => &["sentiment_analysis"],
            InsightPhase::PositiveAspects => &["positive_aspects", "system_strengths"],
            InsightPhase::NegativeAspects => {
                &["negative_aspects", "improvement_areas", "user_pain_points"]
            }
            InsightPhase::Recommendations => &["recommendations", "priority_actions"],
            InsightPhase::ExecutiveSummary => &["executive_summary"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProvenance {
    pub phase: InsightPhase,
    pub source: SectionSource,
    /// Model that produced an accepted remote answer
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMethod {
    RemoteMultiStep,
    Mixed,
    RuleBasedFallback,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightProvenance {
    /// At least one section came from the remote backend
    pub ai_generated: bool,
    pub analysis_method: AnalysisMethod,
    pub steps_completed: u8,
    pub data_points_analyzed: usize,
    pub prompt_version: String,
    /// SHA-256 of the aggregate snapshot the phases consumed
    pub input_digest: String,
    pub sections: Vec<SectionProvenance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightDocument {
    pub executive_summary: String,
    pub positive_aspects: Vec<String>,
    pub negative_aspects: Vec<String>,
    pub recommendations: Vec<String>,
    pub system_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub user_pain_points: Vec<String>,
    pub priority_actions: Vec<String>,
    pub sentiment_analysis: SentimentAnalysis,
    pub provenance: InsightProvenance,
}

impl InsightDocument {
    pub const FIELDS: [&'static str; 9] = [
        "executive_summary",
        "positive_aspects",
        "negative_aspects",
        "recommendations",
        "system_strengths",
        "improvement_areas",
        "user_pain_points",
        "priority_actions",
        "sentiment_analysis",
    ];

    /// Source of one phase's section, if recorded
    pub fn source_of(&self, phase: InsightPhase) -> Option<SectionSource> {
        self.provenance
            .sections
            .iter()
            .find(|section| section.phase == phase)
            .map(|section| section.source)
    }
}
