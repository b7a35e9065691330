//! crate-index-cache - offline cargo registry index cache builder
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use crate_index_cache::cli::{Cli, Commands};
use crate_index_cache::config::{ConfigManager, LogFormat};
use crate_index_cache::error::IndexCacheResult;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> IndexCacheResult<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::locate(cli.config.clone());
    let config = config_manager.load().await?;

    // 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("crate_index_cache=warn"),
        1 => EnvFilter::new("crate_index_cache=info"),
        _ => EnvFilter::new("crate_index_cache=debug"),
    };

    if config.general.log_format == LogFormat::Json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .init();
    }

    debug!("Using config {}", config_manager.path().display());

    match cli.command {
        Commands::Unpack(args) => crate_index_cache::cli::commands::unpack(args, &config).await,
        Commands::Inspect(args) => crate_index_cache::cli::commands::inspect(args).await,
        Commands::Status => crate_index_cache::cli::commands::status(&config).await,
        Commands::Config(args) => {
            crate_index_cache::cli::commands::config(args, &config, &config_manager).await
        }
    }
}
