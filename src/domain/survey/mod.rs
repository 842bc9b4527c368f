// ============================================================
// SURVEY DOMAIN LAYER
// ============================================================
// Value objects flowing through one survey analysis
// No I/O, no async

mod analysis;
mod column;
mod insight;
mod keyword;
mod sentiment;
mod structured;
mod table;

pub use analysis::{AnalysisResult, ColumnTextSummary, DetailedResult, SampleTexts};
pub use column::{ColumnClassification, ColumnKind, ColumnPlan};
pub use insight::{
    AnalysisMethod, InsightDocument, InsightPhase, InsightProvenance, SectionProvenance,
    SectionSource, SentimentAnalysis,
};
pub use keyword::{KeywordFragment, KeywordRecord, KeywordSummary, PosTag};
pub use sentiment::{
    ClassificationMethod, SentimentDistribution, SentimentEvidence, SentimentLabel,
    SentimentOutcome,
};
pub use structured::{ChoiceCount, ChoiceTally, OrdinalAggregate};
pub use table::{Cell, ResponseTable};
