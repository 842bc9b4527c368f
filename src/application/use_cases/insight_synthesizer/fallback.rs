//! Rule-based phase outputs. Pure functions of the snapshot, the lexicon's
//! insight cues and earlier phase outputs.

use std::cmp::Ordering;

use super::prompts::matching_keywords;
use super::snapshot::{ScoreSummary, SurveySnapshot};
use super::types::{
    NegativePhase, PositivePhase, RecommendationPhase, SentimentPhase, SummaryPhase,
};
use crate::domain::lexicon::InsightCues;
use crate::domain::survey::{
    AnalysisMethod, InsightDocument, InsightProvenance, SentimentAnalysis,
};

const POSITIVE_MOOD_RATE: f64 = 60.0;
const HIGH_SATISFACTION_RATE: f64 = 70.0;
const MEDIUM_SATISFACTION_RATE: f64 = 50.0;
const FALLBACK_CONFIDENCE: f64 = 0.75;
const HIGH_INTEREST_RATE: f64 = 70.0;
const LOW_INTEREST_RATE: f64 = 50.0;
const CONFUSION_SHARE: f64 = 0.3;
const CUE_KEYWORDS: usize = 3;
const PAIN_POINT_SAMPLES: usize = 3;

const DEFAULT_ASPECT: &str = "ระบบได้รับการทดสอบและมีผู้ใช้ให้ความคิดเห็น";
const DEFAULT_STRENGTH: &str = "ระบบทำงานตามที่ออกแบบไว้";
const TRAINING_RECOMMENDATION: &str = "ฝึกอบรมผู้ใช้งานเพื่อเพิ่มความมั่นใจ";
const GENERAL_RECOMMENDATIONS: [&str; 4] = [
    "วิเคราะห์ feedback เพิ่มเติมเพื่อหาจุดปรับปรุงที่ชัดเจน",
    "พัฒนาระบบตามความต้องการของผู้ใช้ที่ระบุในความคิดเห็น",
    "ปรับปรุง UX/UI ให้เข้าใจง่ายและใช้งานสะดวกขึ้น",
    "จัดทำคู่มือและระบบช่วยเหลือผู้ใช้งาน",
];
const PRIORITY_ACTIONS: [&str; 3] = [
    "รวบรวมและจัดหมวดหมู่ feedback เพิ่มเติม (0-30 วัน)",
    "วิเคราะห์และจัดทำแผนปรับปรุงระบบ (1-3 เดือน)",
    "ดำเนินการพัฒนาและปรับปรุงตามแผน (3-12 เดือน)",
];

pub fn sentiment(snapshot: &SurveySnapshot) -> SentimentPhase {
    let rate = snapshot.positive_rate();
    let overall_mood = if rate < POSITIVE_MOOD_RATE {
        "เป็นกลาง"
    } else {
        "เชิงบวก"
    };
    let satisfaction_level = if rate >= HIGH_SATISFACTION_RATE {
        "สูง"
    } else if rate >= MEDIUM_SATISFACTION_RATE {
        "ปานกลาง"
    } else {
        "ต่ำ"
    };
    SentimentPhase {
        sentiment_analysis: SentimentAnalysis {
            overall_mood: overall_mood.to_string(),
            satisfaction_level: satisfaction_level.to_string(),
            confidence_score: FALLBACK_CONFIDENCE,
        },
    }
}

pub fn positive(snapshot: &SurveySnapshot, cues: &InsightCues) -> PositivePhase {
    let rate = snapshot.positive_rate();
    let mut positive_aspects = Vec::new();
    let mut system_strengths = Vec::new();

    if rate >= POSITIVE_MOOD_RATE {
        positive_aspects.push(format!("ผู้ใช้มีความพึงพอใจสูง ({:.1}%)", rate));
        system_strengths.push("ระบบได้รับการยอมรับจากผู้ใช้เป็นอย่างดี".to_string());
    }

    let praised = matching_keywords(snapshot, &cues.praise_keywords);
    if !praised.is_empty() {
        positive_aspects.push(format!(
            "ผู้ใช้ชื่นชมในเรื่อง: {}",
            praised[..praised.len().min(CUE_KEYWORDS)].join(", ")
        ));
    }

    if let Some(best) = extreme(snapshot.high_scores(), Ordering::Greater) {
        system_strengths.push(format!("คะแนนสูงสุด: {} ({:.2}/5)", best.label, best.mean));
    }

    if let Some(interest) = interest_rate(snapshot, cues) {
        if interest >= HIGH_INTEREST_RATE {
            positive_aspects.push(format!(
                "ความสนใจในการทดสอบอีกครั้งสูง ({:.1}%)",
                interest
            ));
        }
    }

    if positive_aspects.is_empty() {
        positive_aspects.push(DEFAULT_ASPECT.to_string());
    }
    if system_strengths.is_empty() {
        system_strengths.push(DEFAULT_STRENGTH.to_string());
    }
    PositivePhase {
        positive_aspects,
        system_strengths,
    }
}

pub fn negative(snapshot: &SurveySnapshot, cues: &InsightCues) -> NegativePhase {
    let mut negative_aspects = Vec::new();
    let mut improvement_areas = Vec::new();
    let mut user_pain_points: Vec<String> = Vec::new();

    let problems = matching_keywords(snapshot, &cues.problem_keywords);
    if !problems.is_empty() {
        negative_aspects.push(format!(
            "ปัญหาหลัก: {}",
            problems[..problems.len().min(CUE_KEYWORDS)].join(", ")
        ));
    }

    if let Some(worst) = extreme(snapshot.low_scores(), Ordering::Less) {
        improvement_areas.push(format!(
            "ต้องปรับปรุงเร่งด่วน: {} ({:.2}/5)",
            worst.label, worst.mean
        ));
    }

    for sample in snapshot.negative_samples.iter().take(PAIN_POINT_SAMPLES) {
        let lowered = sample.to_lowercase();
        for cue in &cues.pain_points {
            if lowered.contains(&cue.cue) && !user_pain_points.contains(&cue.pain_point) {
                user_pain_points.push(cue.pain_point.clone());
            }
        }
    }

    if let Some(interest) = interest_rate(snapshot, cues) {
        if interest < LOW_INTEREST_RATE {
            negative_aspects.push(format!(
                "ความสนใจในการทดสอบอีกครั้งต่ำ ({:.1}%)",
                interest
            ));
        }
    }

    for tally in snapshot
        .choices
        .iter()
        .filter(|tally| is_confusion_topic(&tally.label, cues))
    {
        let confused = tally.count_containing(&cues.confusion_value);
        let total = tally.total();
        if confused as f64 > total as f64 * CONFUSION_SHARE {
            negative_aspects.push(format!("ผู้ใช้สับสนเรื่องวันที่ ({}/{})", confused, total));
        }
    }

    NegativePhase {
        negative_aspects,
        improvement_areas,
        user_pain_points,
    }
}

pub fn recommendations(negative: &NegativePhase, cues: &InsightCues) -> RecommendationPhase {
    let mut recommendations: Vec<String> = Vec::new();
    for cue in &cues.pain_points {
        if negative.user_pain_points.contains(&cue.pain_point) {
            recommendations.push(cue.recommendation.clone());
        }
    }
    if !negative.improvement_areas.is_empty() {
        recommendations.push(TRAINING_RECOMMENDATION.to_string());
    }
    recommendations.extend(GENERAL_RECOMMENDATIONS.iter().map(|r| r.to_string()));

    RecommendationPhase {
        recommendations,
        priority_actions: PRIORITY_ACTIONS.iter().map(|a| a.to_string()).collect(),
    }
}

pub fn summary(snapshot: &SurveySnapshot) -> SummaryPhase {
    SummaryPhase {
        executive_summary: format!(
            "จากการวิเคราะห์ {} ความคิดเห็น พบความพึงพอใจ {:.1}% ระบบได้รับการประเมินครบถ้วนและมีข้อเสนอแนะสำหรับการปรับปรุง",
            snapshot.total(),
            snapshot.positive_rate()
        ),
    }
}

/// Document for a survey with nothing to analyze.
pub fn no_data(prompt_version: &str, input_digest: String) -> InsightDocument {
    InsightDocument {
        executive_summary: "ไม่มีข้อมูลเพียงพอสำหรับการวิเคราะห์".to_string(),
        positive_aspects: Vec::new(),
        negative_aspects: Vec::new(),
        recommendations: vec!["รวบรวมข้อมูลเพิ่มเติมจากผู้ใช้".to_string()],
        system_strengths: Vec::new(),
        improvement_areas: Vec::new(),
        user_pain_points: Vec::new(),
        priority_actions: Vec::new(),
        sentiment_analysis: SentimentAnalysis {
            overall_mood: "ไม่สามารถประเมินได้".to_string(),
            satisfaction_level: "ไม่มีข้อมูล".to_string(),
            confidence_score: 0.0,
        },
        provenance: InsightProvenance {
            ai_generated: false,
            analysis_method: AnalysisMethod::NoData,
            steps_completed: 0,
            data_points_analyzed: 0,
            prompt_version: prompt_version.to_string(),
            input_digest,
            sections: Vec::new(),
        },
    }
}

/// Highest (`Greater`) or lowest (`Less`) mean; the first one wins a tie.
fn extreme(scores: Vec<&ScoreSummary>, wanted: Ordering) -> Option<&ScoreSummary> {
    scores.into_iter().fold(None, |best, score| match best {
        Some(current)
            if score.mean.partial_cmp(&current.mean).unwrap_or(Ordering::Equal) != wanted =>
        {
            Some(current)
        }
        _ => Some(score),
    })
}

fn is_confusion_topic(label: &str, cues: &InsightCues) -> bool {
    !label.contains(&cues.interest_topic) && label.contains(&cues.confusion_topic)
}

/// Share of "interested" answers in the first interest-topic tally, in percent
fn interest_rate(snapshot: &SurveySnapshot, cues: &InsightCues) -> Option<f64> {
    snapshot
        .choices
        .iter()
        .find(|tally| tally.label.contains(&cues.interest_topic))
        .filter(|tally| tally.total() > 0)
        .map(|tally| tally.count_of(&cues.interest_value) as f64 / tally.total() as f64 * 100.0)
}
