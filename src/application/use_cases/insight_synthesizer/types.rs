//! Shapes a remote phase answer must deserialize into.

use serde::{Deserialize, Serialize};

use crate::domain::survey::SentimentAnalysis;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentPhase {
    pub sentiment_analysis: SentimentAnalysis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositivePhase {
    pub positive_aspects: Vec<String>,
    pub system_strengths: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegativePhase {
    pub negative_aspects: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub user_pain_points: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationPhase {
    pub recommendations: Vec<String>,
    pub priority_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryPhase {
    pub executive_summary: String,
}
