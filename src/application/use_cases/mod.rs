pub mod column_classifier;
pub mod insight_synthesizer;
pub mod keyword_extractor;
pub mod sentiment;
pub mod structured_analyzer;
pub mod survey_pipeline;
pub mod text_normalizer;
pub mod tokenizer;
