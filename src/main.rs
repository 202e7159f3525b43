mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use commands::Workspace;
use painpoint_core::{AppConfig, CoreError, RedditCredentials};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str =
    "painpoint=info,reddit_client=info,analysis_engine=info,storage=info,report_renderer=info";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = Cli::parse();
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::report_failure(&e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).map_err(CoreError::from)?;

    // Resolved before any stage runs so a missing variable aborts cleanly.
    let credentials = if cli.command.needs_credentials() {
        Some(RedditCredentials::from_env().map_err(CoreError::from)?)
    } else {
        None
    };

    let ws = Workspace::new(config, cli.data_dir);

    match (cli.command, credentials) {
        (Command::Run { limit }, Some(credentials)) => {
            commands::run(&ws, &credentials, limit).await?;
        }
        (Command::Scrape { limit, output }, Some(credentials)) => {
            commands::scrape(&ws, &credentials, limit, output).await?;
        }
        (Command::Clean { input, output }, _) => {
            commands::clean(&ws, &input, output)?;
        }
        (Command::Extract { input, output }, _) => {
            commands::extract(&ws, &input, output)?;
        }
        (
            Command::Prioritize {
                input,
                output,
                keyword,
                top,
            },
            _,
        ) => {
            commands::prioritize_posts(&ws, &input, output, keyword.as_deref(), top)?;
        }
        (
            Command::Report {
                priority,
                posts,
                output,
                format,
            },
            _,
        ) => {
            commands::report(&ws, &priority, &posts, output, format)?;
        }
        (Command::Stats { input, top_words }, _) => {
            commands::stats(&ws, &input, top_words)?;
        }
        (Command::Run { .. } | Command::Scrape { .. }, None) => {
            return Err(CoreError::Internal {
                message: "Reddit credentials were not loaded".to_string(),
            }
            .into());
        }
    }

    Ok(())
}
