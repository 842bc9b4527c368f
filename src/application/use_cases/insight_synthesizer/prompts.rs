//! Versioned prompt templates and the inputs each phase feeds them.

use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::snapshot::{ScoreSummary, SurveySnapshot};
use super::types::{NegativePhase, PositivePhase, RecommendationPhase, SentimentPhase};
use crate::domain::error::{AppError, Result};
use crate::domain::lexicon::InsightCues;

const EMBEDDED_PROMPTS: &str = include_str!("../../../../resources/prompts.toml");

pub const MAX_SAMPLE_CHARS: usize = 120;
const SUMMARY_SAMPLES: usize = 3;
const SUMMARY_KEYWORDS: usize = 8;
const LIST_ITEMS: usize = 4;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").unwrap());
const KEY_FINDINGS_PER_SIDE: usize = 2;
const TOP_RECOMMENDATIONS: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PromptTemplates {
    #[validate(length(min = 1))]
    pub version: String,
    #[validate(length(min = 1))]
    pub empty_marker: String,
    #[validate(length(min = 1))]
    pub sentiment_summary: String,
    #[validate(length(min = 1))]
    pub positive_aspects: String,
    #[validate(length(min = 1))]
    pub negative_aspects: String,
    #[validate(length(min = 1))]
    pub recommendations: String,
    #[validate(length(min = 1))]
    pub executive_summary: String,
}

impl PromptTemplates {
    pub fn embedded() -> Result<Self> {
        Self::from_figment(Figment::from(Toml::string(EMBEDDED_PROMPTS)))
    }

    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        match override_path {
            Some(path) if !path.exists() => Err(AppError::Configuration(format!(
                "Prompt file not found: {}",
                path.display()
            ))),
            Some(path) => Self::from_figment(Figment::from(Toml::file(path))),
            None => Self::embedded(),
        }
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let templates: PromptTemplates = figment
            .extract()
            .map_err(|e| AppError::Configuration(format!("Invalid prompts: {}", e)))?;
        templates
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid prompts: {}", e)))?;
        Ok(templates)
    }

    pub fn sentiment_prompt(&self, snapshot: &SurveySnapshot) -> String {
        let distribution = &snapshot.distribution;
        render(
            &self.sentiment_summary,
            &[
                ("positive", distribution.positive.to_string()),
                ("neutral", distribution.neutral.to_string()),
                ("negative", distribution.negative.to_string()),
                ("total", snapshot.total().to_string()),
                ("positive_rate", format!("{:.1}", snapshot.positive_rate())),
                (
                    "top_keywords",
                    snapshot
                        .top_keywords
                        .iter()
                        .take(SUMMARY_KEYWORDS)
                        .cloned()
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
                (
                    "negative_samples",
                    self.format_samples(head(&snapshot.negative_samples, SUMMARY_SAMPLES)),
                ),
                (
                    "positive_samples",
                    self.format_samples(head(&snapshot.positive_samples, SUMMARY_SAMPLES)),
                ),
            ],
        )
    }

    pub fn positive_prompt(&self, snapshot: &SurveySnapshot, cues: &InsightCues) -> String {
        render(
            &self.positive_aspects,
            &[
                ("positive_samples", self.format_samples(&snapshot.positive_samples)),
                ("high_scores", self.format_scores(&snapshot.high_scores())),
                (
                    "praise_keywords",
                    matching_keywords(snapshot, &cues.praise_keywords).join(", "),
                ),
            ],
        )
    }

    pub fn negative_prompt(&self, snapshot: &SurveySnapshot, cues: &InsightCues) -> String {
        render(
            &self.negative_aspects,
            &[
                ("negative_samples", self.format_samples(&snapshot.negative_samples)),
                ("low_scores", self.format_scores(&snapshot.low_scores())),
                (
                    "problem_keywords",
                    matching_keywords(snapshot, &cues.problem_keywords).join(", "),
                ),
            ],
        )
    }

    pub fn recommendation_prompt(
        &self,
        sentiment: &SentimentPhase,
        positive: &PositivePhase,
        negative: &NegativePhase,
    ) -> String {
        let strengths: Vec<String> = positive
            .positive_aspects
            .iter()
            .chain(&positive.system_strengths)
            .take(LIST_ITEMS)
            .cloned()
            .collect();
        let problems: Vec<String> = negative
            .negative_aspects
            .iter()
            .chain(&negative.user_pain_points)
            .take(LIST_ITEMS)
            .cloned()
            .collect();
        render(
            &self.recommendations,
            &[
                ("strengths", self.format_list(&strengths)),
                ("problems", self.format_list(&problems)),
                (
                    "satisfaction_level",
                    sentiment.sentiment_analysis.satisfaction_level.clone(),
                ),
            ],
        )
    }

    pub fn summary_prompt(
        &self,
        snapshot: &SurveySnapshot,
        sentiment: &SentimentPhase,
        positive: &PositivePhase,
        negative: &NegativePhase,
        recommendations: &RecommendationPhase,
    ) -> String {
        let key_findings: Vec<String> = positive
            .positive_aspects
            .iter()
            .take(KEY_FINDINGS_PER_SIDE)
            .chain(negative.negative_aspects.iter().take(KEY_FINDINGS_PER_SIDE))
            .cloned()
            .collect();
        let top_recommendations: Vec<String> = recommendations
            .recommendations
            .iter()
            .take(TOP_RECOMMENDATIONS)
            .cloned()
            .collect();
        render(
            &self.executive_summary,
            &[
                ("respondents", snapshot.respondents.to_string()),
                ("total", snapshot.total().to_string()),
                ("positive_rate", format!("{:.1}", snapshot.positive_rate())),
                (
                    "satisfaction_level",
                    sentiment.sentiment_analysis.satisfaction_level.clone(),
                ),
                ("key_findings", self.format_list(&key_findings)),
                ("top_recommendations", self.format_list(&top_recommendations)),
            ],
        )
    }

    /// Numbered, quote-safe, single-line samples cut at 120 characters.
    pub fn format_samples(&self, texts: &[String]) -> String {
        if texts.is_empty() {
            return self.empty_marker.clone();
        }
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let flat = text.replace('"', "'").replace('\n', " ");
                let flat = flat.trim();
                let mut line: String = flat.chars().take(MAX_SAMPLE_CHARS).collect();
                if flat.chars().count() > MAX_SAMPLE_CHARS {
                    line.push_str("...");
                }
                format!("{}. {}", i + 1, line)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_scores(&self, scores: &[&ScoreSummary]) -> String {
        if scores.is_empty() {
            return self.empty_marker.clone();
        }
        scores
            .iter()
            .map(|score| format!("- {}: {:.2}/5.0", score.label, score.mean))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn format_list(&self, items: &[String]) -> String {
        if items.is_empty() {
            return self.empty_marker.clone();
        }
        items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn head<T>(items: &[T], n: usize) -> &[T] {
    &items[..n.min(items.len())]
}

/// Top keywords that appear in a cue list, in ranking order
pub(crate) fn matching_keywords<'a>(snapshot: &'a SurveySnapshot, cues: &[String]) -> Vec<&'a str> {
    snapshot
        .top_keywords
        .iter()
        .filter(|keyword| cues.contains(keyword))
        .map(String::as_str)
        .collect()
}

/// Replaces `{{name}}` placeholders in one pass over the template; unknown
/// placeholders stay as written and substituted values are never expanded.
pub fn render(template: &str, values: &[(&str, String)]) -> String {
    PLACEHOLDER
        .replace_all(template.trim(), |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::lexicon::Lexicon;
    use crate::domain::survey::SentimentDistribution;

    fn snapshot() -> SurveySnapshot {
        SurveySnapshot {
            respondents: 31,
            distribution: SentimentDistribution::new(15, 8, 2),
            top_keywords: vec!["ระบบ".to_string(), "ง่าย".to_string(), "ช้า".to_string()],
            positive_samples: vec!["ใช้งานง่าย".to_string()],
            negative_samples: Vec::new(),
            scores: vec![ScoreSummary {
                label: "ความพอใจ".to_string(),
                mean: 4.25,
            }],
            choices: Vec::new(),
        }
    }

    #[test]
    fn embedded_templates_load() {
        let templates = PromptTemplates::embedded().unwrap();
        assert_eq!(templates.version, "v1");
        assert!(templates.sentiment_summary.contains("{{positive_rate}}"));
    }

    #[test]
    fn render_fills_known_placeholders_only() {
        let rendered = render("{{a}} and {{b}}", &[("a", "1".to_string())]);
        assert_eq!(rendered, "1 and {{b}}");
    }

    #[test]
    fn placeholders_inside_values_are_left_alone() {
        let rendered = render(
            "{{samples}} / {{total}}",
            &[
                ("samples", "ตอบว่า {{total}}".to_string()),
                ("total", "25".to_string()),
            ],
        );
        assert_eq!(rendered, "ตอบว่า {{total}} / 25");
    }

    #[test]
    fn sentiment_prompt_carries_counts_and_empty_marker() {
        let templates = PromptTemplates::embedded().unwrap();
        let prompt = templates.sentiment_prompt(&snapshot());
        assert!(prompt.contains("Positive: 15 responses (60.0%)"));
        assert!(prompt.contains("รวม: 25 responses"));
        assert!(prompt.contains("ไม่มีข้อมูล"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn positive_prompt_lists_high_scores_and_praise() {
        let templates = PromptTemplates::embedded().unwrap();
        let cues = Lexicon::embedded().unwrap().insight;
        let prompt = templates.positive_prompt(&snapshot(), &cues);
        assert!(prompt.contains("- ความพอใจ: 4.25/5.0"));
        assert!(prompt.contains("Keywords เชิงบวก: ง่าย"));
    }

    #[test]
    fn samples_are_flattened_and_truncated() {
        let templates = PromptTemplates::embedded().unwrap();
        let long = "ก".repeat(130);
        let formatted =
            templates.format_samples(&["say \"hi\"\nnow".to_string(), long.clone()]);
        let lines: Vec<&str> = formatted.lines().collect();
        assert_eq!(lines[0], "1. say 'hi' now");
        assert_eq!(lines[1], format!("2. {}...", "ก".repeat(120)));
    }

    #[test]
    fn missing_override_is_a_configuration_error() {
        assert!(matches!(
            PromptTemplates::load(Some(Path::new("/nonexistent/prompts.toml"))),
            Err(AppError::Configuration(_))
        ));
    }
}
