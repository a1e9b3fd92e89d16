//! Kea CLI - Bank statement analyzer and budget advisor
//!
//! Usage:
//!   kea import statement.csv        Import and classify a statement
//!   kea report statement.csv        Monthly budget report
//!   kea goals statement.csv         Savings goal recommendations
//!   kea banks                       List known bank formats

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Import { files } => {
            commands::cmd_import(&files, cli.bank_configs.as_deref()).await
        }
        Commands::Report { files, month } => {
            commands::cmd_report(&files, month.as_deref(), cli.bank_configs.as_deref()).await
        }
        Commands::Goals { files, months } => {
            commands::cmd_goals(&files, months, cli.bank_configs.as_deref()).await
        }
        Commands::Banks => commands::cmd_banks(cli.bank_configs.as_deref()),
    }
}
