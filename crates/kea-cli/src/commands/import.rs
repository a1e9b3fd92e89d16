//! Import command implementation

use std::path::{Path, PathBuf};

use anyhow::Result;
use kea_core::Category;

use super::{build_pipeline, import_files};

pub async fn cmd_import(files: &[PathBuf], bank_configs: Option<&Path>) -> Result<()> {
    let (pipeline, store) = build_pipeline(bank_configs)?;
    import_files(&pipeline, files).await?;

    let transactions = store.all();
    println!("✅ Import complete!");
    println!("   Transactions: {}", transactions.len());

    let ignored = transactions.iter().filter(|t| t.is_ignored).count();
    if ignored > 0 {
        println!("   Excluded from totals (transfers/reversals): {}", ignored);
    }
    let uncategorized = transactions
        .iter()
        .filter(|t| t.category == Category::Other)
        .count();
    if uncategorized > 0 {
        println!("   Uncategorized: {}", uncategorized);
    }

    Ok(())
}
