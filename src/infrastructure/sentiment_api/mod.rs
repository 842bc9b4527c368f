pub mod ssense;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::infrastructure::remote::RemoteFailure;

pub use ssense::SsenseClient;

/// Provider answer for one text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentApiResponse {
    pub polarity: String,
    /// Provider confidence in [0, 1]
    pub score: Option<f64>,
    pub positive_words: Vec<String>,
    pub negative_words: Vec<String>,
    pub keywords: Vec<String>,
}

#[async_trait]
pub trait SentimentApiClient: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<SentimentApiResponse, RemoteFailure>;
}
