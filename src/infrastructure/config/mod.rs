//! Process settings and API-key resolution.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `SURVEY_`-prefixed environment variables (`__` separates nested keys).
//! API keys resolve from settings, then the conventional environment
//! variable, then the OS keyring.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::debug;
use validator::Validate;

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use crate::infrastructure::security::keyring::KeyringManager;
use crate::infrastructure::sentiment_api::ssense::DEFAULT_SSENSE_URL;

pub const DEFAULT_CONFIG_FILE: &str = "survey-insight.toml";
pub const ENV_PREFIX: &str = "SURVEY_";
pub const KEYRING_SERVICE: &str = "survey-insight";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    #[validate(range(min = 0, max = 2))]
    pub default_strategy: i32,
    #[validate(nested)]
    pub corpus: CorpusSettings,
    #[validate(nested)]
    pub sentiment_api: SentimentApiSettings,
    #[validate(nested)]
    pub gemini: GeminiSettings,
    pub lexicon_path: Option<PathBuf>,
    pub prompts_path: Option<PathBuf>,
    #[validate(length(min = 1))]
    pub log_filter: String,
    #[validate(range(min = 1))]
    pub keyword_limit: usize,
    #[validate(range(min = 1, max = 20))]
    pub sample_limit: usize,
}

/// Training corpus for the compression nearest-neighbor strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CorpusSettings {
    /// Directory holding positive.txt / negative.txt / neutral.txt
    pub path: Option<PathBuf>,
    /// Below this many examples the bootstrap set is appended
    #[validate(range(min = 1))]
    pub min_examples: usize,
    #[validate(range(min = 1))]
    pub neighbors: usize,
    /// Write the bootstrap files when the corpus files are missing
    pub write_bootstrap: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SentimentApiSettings {
    #[validate(length(min = 1))]
    pub base_url: String,
    pub api_key: Option<String>,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeminiSettings {
    #[validate(length(min = 1))]
    pub base_url: String,
    pub api_key: Option<String>,
    pub top_k: u32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub top_p: f32,
    /// Pause before moving on after a 429
    pub rate_limit_backoff_ms: u64,
    #[validate(length(min = 1), nested)]
    pub models: Vec<ModelProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ModelProfile {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub timeout_secs: u64,
    #[validate(range(min = 1))]
    pub max_tokens: u32,
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_strategy: 0,
            corpus: CorpusSettings {
                path: Some(PathBuf::from("data/training")),
                min_examples: 50,
                neighbors: 1,
                write_bootstrap: true,
            },
            sentiment_api: SentimentApiSettings {
                base_url: DEFAULT_SSENSE_URL.to_string(),
                api_key: None,
                timeout_secs: 10,
            },
            gemini: GeminiSettings {
                base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
                api_key: None,
                top_k: 40,
                top_p: 0.8,
                rate_limit_backoff_ms: 2000,
                models: vec![ModelProfile {
                    name: "gemini-2.0-flash".to_string(),
                    timeout_secs: 25,
                    max_tokens: 1200,
                    temperature: 0.2,
                }],
            },
            lexicon_path: None,
            prompts_path: None,
            log_filter: "info".to_string(),
            keyword_limit: 25,
            sample_limit: 5,
        }
    }
}

impl Settings {
    /// Load `.env`, then layer defaults, the TOML file and the environment.
    ///
    /// An explicit `config_path` must exist; the default file is optional.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let file = match config_path {
            Some(path) if !path.exists() => {
                return Err(AppError::Configuration(format!(
                    "Config file not found: {}",
                    path.display()
                )))
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        Self::from_figment(
            Figment::from(Serialized::defaults(Settings::default()))
                .merge(Toml::file(file))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| AppError::Configuration(format!("Invalid settings: {}", e)))?;
        settings
            .validate()
            .map_err(|e| AppError::ValidationError(format!("Invalid settings: {}", e)))?;
        Ok(settings)
    }

    /// Ordered generation cascade, one entry per configured model.
    pub fn generation_profiles(&self, api_key: Option<String>) -> Vec<LLMConfig> {
        self.gemini
            .models
            .iter()
            .map(|model| LLMConfig {
                base_url: self.gemini.base_url.clone(),
                model: model.name.clone(),
                api_key: api_key.clone(),
                max_tokens: Some(model.max_tokens),
                temperature: Some(model.temperature),
                top_k: Some(self.gemini.top_k),
                top_p: Some(self.gemini.top_p),
                timeout_secs: model.timeout_secs,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiProvider {
    Gemini,
    Ssense,
}

impl ApiProvider {
    pub fn env_var(self) -> &'static str {
        match self {
            ApiProvider::Gemini => "GEMINI_API_KEY",
            ApiProvider::Ssense => "SSENSE_API_KEY",
        }
    }

    pub fn account(self) -> &'static str {
        match self {
            ApiProvider::Gemini => "gemini",
            ApiProvider::Ssense => "ssense",
        }
    }
}

pub struct ConfigService {
    keyring: KeyringManager,
}

impl ConfigService {
    pub fn new() -> Self {
        Self {
            keyring: KeyringManager::new(KEYRING_SERVICE),
        }
    }

    pub fn save_api_key(&self, provider: ApiProvider, key: &str) -> Result<()> {
        self.keyring.set_secret(provider.account(), key)
    }

    pub fn delete_api_key(&self, provider: ApiProvider) -> Result<()> {
        self.keyring.delete_secret(provider.account())
    }

    /// First non-empty key from settings, environment, then keyring.
    pub fn resolve_api_key(&self, provider: ApiProvider, configured: Option<&str>) -> Option<String> {
        if let Some(key) = non_empty(configured) {
            return Some(key);
        }
        if let Some(key) = non_empty(std::env::var(provider.env_var()).ok().as_deref()) {
            return Some(key);
        }
        match self.keyring.get_secret(provider.account()) {
            Ok(key) => non_empty(key.as_deref()),
            Err(err) => {
                debug!(provider = provider.account(), error = %err, "Keyring unavailable");
                None
            }
        }
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
