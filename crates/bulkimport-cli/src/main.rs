//! bulkimport CLI - Main entry point

use anyhow::Context;
use bulkimport_cli::{CliConfig, CliError, Cli};
use bulkimport_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Info
        })
        .output(LogOutput::Console)
        .log_file_prefix("bulkimport")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // Keep importing even if logging cannot be set up
    let _guard = init_logging(&log_config).ok();

    if let Err(e) = execute(&cli).await {
        let code = e
            .downcast_ref::<CliError>()
            .map(CliError::exit_code)
            .unwrap_or(bulkimport_cli::error::EXIT_FAILURE);
        error!(error = %format!("{e:#}"), "Import did not finish cleanly");
        eprintln!("Error: {e:#}");
        process::exit(code);
    }
}

async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = CliConfig::from_cli(cli).context("Invalid arguments")?;
    bulkimport_cli::import::run(config).await?;
    Ok(())
}
