pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

pub use application::use_cases::sentiment::SentimentEngine;
pub use application::use_cases::survey_pipeline::{PipelineOptions, SurveyPipeline};
pub use domain::error::{AppError, Result};
pub use domain::survey::{AnalysisResult, ResponseTable};

/// Installs the global `tracing` subscriber. `RUST_LOG` wins over `default_filter`;
/// later calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
