pub mod error;
pub mod lexicon;
pub mod llm_config;
pub mod strategy;

// Survey analysis value objects
pub mod survey;
