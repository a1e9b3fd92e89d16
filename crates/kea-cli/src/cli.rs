//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Kea - Statement import, classification and budgeting
#[derive(Parser)]
#[command(name = "kea")]
#[command(about = "Bank statement analyzer and budget advisor", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON file with additional bank configs to register
    #[arg(long, global = true)]
    pub bank_configs: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import statement CSVs and show what was parsed
    Import {
        /// CSV files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Import statement CSVs and print a monthly budget report
    Report {
        /// CSV files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Month to report on, e.g. 2024-05 (defaults to the latest month)
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Import statement CSVs and propose savings goals
    Goals {
        /// CSV files to import
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// How many recent months to base recommendations on
        #[arg(long, default_value = "3")]
        months: usize,
    },

    /// List registered bank formats
    Banks,
}
