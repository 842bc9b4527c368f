pub mod use_cases;

pub use use_cases::insight_synthesizer::InsightSynthesizer;
pub use use_cases::sentiment::SentimentEngine;
pub use use_cases::survey_pipeline::SurveyPipeline;
