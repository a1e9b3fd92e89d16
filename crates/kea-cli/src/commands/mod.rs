//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `import` - Statement import with per-file summaries
//! - `report` - Monthly budget report
//! - `goals` - Savings goal recommendations
//! - `banks` - Registered bank format listing

pub mod banks;
pub mod goals;
pub mod import;
pub mod report;

// Re-export command functions for main.rs
pub use banks::*;
pub use goals::*;
pub use import::*;
pub use report::*;

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use kea_core::{BankRegistry, ImportSummary, MemoryStore, Pipeline};

/// Registry with builtins plus any configs from a user-supplied JSON file
pub fn build_registry(bank_configs: Option<&Path>) -> Result<BankRegistry> {
    let registry = BankRegistry::default();
    if let Some(path) = bank_configs {
        let file = File::open(path)
            .with_context(|| format!("Failed to open bank configs: {}", path.display()))?;
        let count = registry
            .add_configs_from_json(file)
            .with_context(|| format!("Invalid bank config file: {}", path.display()))?;
        debug!(path = %path.display(), count, "Loaded user bank configs");
    }
    Ok(registry)
}

/// Import each file into a fresh in-memory store, printing per-file results.
pub async fn import_files(
    pipeline: &Pipeline,
    files: &[std::path::PathBuf],
) -> Result<Vec<ImportSummary>> {
    let mut summaries = Vec::new();
    for file in files {
        println!("📥 Importing {}...", file.display());
        let (headers, rows) = kea_core::source::rows_from_path(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        debug!(file = %file.display(), rows = rows.len(), "Read statement rows");
        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| file.display().to_string());

        let summary = pipeline.import(&filename, &headers, &rows).await?;
        println!(
            "   {} ({} confidence): {} parsed, {} accepted, {} duplicates, {} reversal pairs",
            summary.detected_bank,
            summary.confidence,
            summary.parsed,
            summary.accepted,
            summary.duplicates_skipped,
            summary.reversal_pairs
        );
        for warning in &summary.warnings {
            println!("   ⚠️  {}", warning);
        }
        summaries.push(summary);
    }
    Ok(summaries)
}

/// Pipeline over a shared in-memory store for one CLI run
pub fn build_pipeline(bank_configs: Option<&Path>) -> Result<(Pipeline, Arc<MemoryStore>)> {
    let registry = build_registry(bank_configs)?;
    let store = Arc::new(MemoryStore::new());
    Ok((Pipeline::new(registry, store.clone()), store))
}
