//! Smart Contact Manager - session client entry point
//!
//! Loads settings, wires the session core once, restores the persisted
//! session and runs a single command against it.

mod cli;
mod commands;
mod context;

use std::process::ExitCode;

use clap::Parser;
use scm_domain::route::OAUTH_CALLBACK_PATH;
use scm_infrastructure::AppSettings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::context::AppContext;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = cli.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let settings = AppSettings::load(cli.config.as_deref())?;
    tracing::debug!(base_url = %settings.api.base_url, "Settings loaded");

    let start = match &cli.command {
        Command::OauthCallback { .. } => OAUTH_CALLBACK_PATH,
        _ => "/",
    };
    let mut ctx = AppContext::build(settings, start)?;

    let mut stdout = std::io::stdout().lock();
    match commands::run(&mut ctx, cli.command, &mut stdout).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            tracing::debug!(error = %e, "Command failed");
            eprintln!("error: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
