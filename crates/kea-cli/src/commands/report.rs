//! Monthly budget report command

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::debug;

use kea_core::{aggregate, ClassifiedTransaction};

use super::{build_pipeline, import_files};

pub async fn cmd_report(
    files: &[PathBuf],
    month: Option<&str>,
    bank_configs: Option<&Path>,
) -> Result<()> {
    let (pipeline, store) = build_pipeline(bank_configs)?;
    import_files(&pipeline, files).await?;

    let transactions = store.all();
    if transactions.is_empty() {
        bail!("No transactions imported; nothing to report on");
    }

    let month = match month {
        Some(m) => m.to_string(),
        None => latest_month(&transactions),
    };
    debug!(%month, transactions = transactions.len(), "Building budget report");

    let budget = aggregate(&transactions, &month);

    println!();
    println!("📊 Budget for {}", budget.month);
    println!("   Income:   ${:>10.2}", budget.total_income);
    println!("   Expenses: ${:>10.2}", budget.total_expenses);
    println!(
        "   Savings:  ${:>10.2} ({:.1}%)",
        budget.savings, budget.savings_rate
    );

    if !budget.categories.is_empty() {
        println!();
        println!("   By category:");
        for (name, stats) in &budget.categories {
            println!(
                "     {:<14} ${:>9.2}  ({} tx, avg ${:.2}, {})",
                name,
                stats.amount,
                stats.transaction_count,
                stats.average_per_transaction,
                stats.budget_group
            );
        }
    }

    if !budget.insights.top_expense_categories.is_empty() {
        println!();
        println!("   Top expenses:");
        for (name, amount) in &budget.insights.top_expense_categories {
            println!("     {:<14} ${:.2}", name, amount);
        }
    }
    if let Some(change) = budget.insights.month_over_month_change {
        println!();
        println!("   Expenses vs previous month: {:+.1}%", change);
    }

    Ok(())
}

/// Latest month key present in the imported set
pub(crate) fn latest_month(transactions: &[ClassifiedTransaction]) -> String {
    transactions
        .iter()
        .map(|t| t.month_year.clone())
        .max()
        .unwrap_or_default()
}
