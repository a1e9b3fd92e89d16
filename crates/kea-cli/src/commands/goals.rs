//! Goal recommendation command

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use kea_core::{aggregate, recommend, MonthlyBudget};

use super::{build_pipeline, import_files};

pub async fn cmd_goals(
    files: &[PathBuf],
    months: usize,
    bank_configs: Option<&Path>,
) -> Result<()> {
    let (pipeline, store) = build_pipeline(bank_configs)?;
    import_files(&pipeline, files).await?;

    let transactions = store.all();
    if transactions.is_empty() {
        bail!("No transactions imported; nothing to recommend from");
    }

    // Most recent N months present in the data, oldest first
    let month_keys: BTreeSet<String> =
        transactions.iter().map(|t| t.month_year.clone()).collect();
    let budgets: Vec<MonthlyBudget> = month_keys
        .iter()
        .rev()
        .take(months)
        .rev()
        .map(|month| aggregate(&transactions, month))
        .collect();

    let goals = recommend(&budgets);
    if goals.is_empty() {
        println!("No goal recommendations for this period.");
        return Ok(());
    }

    println!();
    println!("🎯 Recommended goals (based on {} month(s)):", budgets.len());
    for goal in &goals {
        println!();
        println!("   {} [{}]", goal.description, goal.achievability);
        println!(
            "     Target: ${:.2} over {} month(s)",
            goal.target_amount, goal.timeframe_months
        );
        println!("     {}", goal.rationale);
    }

    Ok(())
}
