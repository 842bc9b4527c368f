//! Command-line surface: analyze a survey export, inspect strategies, manage
//! API keys in the OS keyring.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::application::use_cases::sentiment::SentimentEngine;
use crate::domain::error::{AppError, Result};
use crate::domain::strategy::StrategyId;
use crate::infrastructure::bootstrap::build_pipeline;
use crate::infrastructure::config::{ApiProvider, ConfigService, Settings};
use crate::infrastructure::csv::load_table;
use crate::infrastructure::storage::ensure_parent_dir;

#[derive(Debug, Parser)]
#[command(name = "survey-insight", version, about = "Thai survey sentiment, keywords and insights")]
pub struct Cli {
    /// Settings file; `survey-insight.toml` in the working directory is used when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a CSV or XLSX survey export and print the JSON result
    Analyze {
        file: PathBuf,
        /// Sentiment strategy id (0 lexicon, 1 compression nearest-neighbor, 2 SSense API)
        #[arg(long)]
        strategy: Option<i32>,
        #[arg(long)]
        analysis_id: Option<String>,
        /// Write the result here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List the available sentiment strategies
    Strategies,
    /// Store an API key in the OS keyring
    SetKey { provider: Provider, key: String },
    /// Remove a stored API key
    DeleteKey { provider: Provider },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Provider {
    Gemini,
    Ssense,
}

impl From<Provider> for ApiProvider {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Gemini => ApiProvider::Gemini,
            Provider::Ssense => ApiProvider::Ssense,
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    crate::init_tracing(&settings.log_filter);
    let config_service = ConfigService::new();

    match cli.command {
        Command::Analyze {
            file,
            strategy,
            analysis_id,
            output,
        } => {
            if let Some(id) = strategy {
                StrategyId::try_from(id).map_err(|id| {
                    AppError::ValidationError(format!("Unknown strategy id: {}", id))
                })?;
                settings.default_strategy = id;
            }

            let table = load_table(&file)?;
            let pipeline = build_pipeline(&settings, &config_service).await?;
            let analysis_id = analysis_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let result = pipeline.analyze(&table, &analysis_id).await?;
            let json = serde_json::to_string_pretty(&result)?;

            match output {
                Some(path) => {
                    ensure_parent_dir(&path)?;
                    std::fs::write(&path, json)?;
                    info!(output = %path.display(), "Analysis written");
                }
                None => println!("{}", json),
            }
        }
        Command::Strategies => {
            let strategies = SentimentEngine::list_strategies();
            println!("{}", serde_json::to_string_pretty(&strategies)?);
        }
        Command::SetKey { provider, key } => {
            config_service.save_api_key(provider.into(), &key)?;
            info!(provider = ApiProvider::from(provider).account(), "API key stored");
        }
        Command::DeleteKey { provider } => {
            config_service.delete_api_key(provider.into())?;
            info!(provider = ApiProvider::from(provider).account(), "API key removed");
        }
    }
    Ok(())
}
