use std::process::ExitCode;

use clap::Parser;
use survey_insight_lib::interfaces::cli::{run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "survey-insight failed");
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
