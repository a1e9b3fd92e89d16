//! Monthly budget aggregation
//!
//! Builds a MonthlyBudget from a classified batch: income and expense totals,
//! per-category stats, and derived insights. Transfers and reversals carry
//! `is_ignored` and are excluded from every figure here.

use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};
use tracing::debug;

use crate::models::{
    BudgetInsights, CategoryStats, ClassifiedTransaction, MonthlyBudget,
};

const TOP_CATEGORY_COUNT: usize = 3;

/// Aggregate one month of classified transactions.
///
/// `transactions` may span multiple months; only rows whose `month_year`
/// equals `month` count, though the month before is used for the
/// month-over-month comparison when present.
pub fn aggregate(transactions: &[ClassifiedTransaction], month: &str) -> MonthlyBudget {
    let mut total_income = 0.0;
    let mut total_expenses = 0.0;
    let mut categories: BTreeMap<String, CategoryStats> = BTreeMap::new();

    for tx in transactions
        .iter()
        .filter(|t| t.month_year == month && !t.is_ignored)
    {
        if tx.is_income {
            total_income += tx.amount;
        } else {
            total_expenses += tx.amount;
        }

        let stats = categories
            .entry(tx.category.to_string())
            .or_insert_with(|| CategoryStats {
                amount: 0.0,
                budget_group: tx.budget_group,
                transaction_count: 0,
                average_per_transaction: 0.0,
                is_income: tx.is_income,
            });
        stats.amount += tx.amount;
        stats.transaction_count += 1;
        stats.average_per_transaction = stats.amount / stats.transaction_count as f64;
    }

    let savings = total_income - total_expenses;
    // Zero income months must not divide by zero
    let savings_rate = if total_income > 0.0 {
        100.0 * savings / total_income
    } else {
        0.0
    };

    let insights = build_insights(&categories, transactions, month, total_expenses);

    debug!(
        month,
        total_income, total_expenses, savings_rate, "Aggregated monthly budget"
    );

    MonthlyBudget {
        month: month.to_string(),
        total_income,
        total_expenses,
        savings,
        savings_rate,
        categories,
        insights,
    }
}

fn build_insights(
    categories: &BTreeMap<String, CategoryStats>,
    transactions: &[ClassifiedTransaction],
    month: &str,
    total_expenses: f64,
) -> BudgetInsights {
    let mut expense_categories: Vec<(String, f64)> = categories
        .iter()
        .filter(|(_, stats)| !stats.is_income)
        .map(|(name, stats)| (name.clone(), stats.amount))
        .collect();
    expense_categories
        .sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    expense_categories.truncate(TOP_CATEGORY_COUNT);

    let mut expenses_by_budget_group: BTreeMap<String, f64> = BTreeMap::new();
    for stats in categories.values().filter(|s| !s.is_income) {
        *expenses_by_budget_group
            .entry(stats.budget_group.to_string())
            .or_insert(0.0) += stats.amount;
    }

    let month_over_month_change = previous_month(month).and_then(|prev| {
        let prev_expenses: f64 = transactions
            .iter()
            .filter(|t| t.month_year == prev && !t.is_ignored && !t.is_income)
            .map(|t| t.amount)
            .sum();
        if prev_expenses > 0.0 {
            Some(100.0 * (total_expenses - prev_expenses) / prev_expenses)
        } else {
            None
        }
    });

    BudgetInsights {
        top_expense_categories: expense_categories,
        expenses_by_budget_group,
        month_over_month_change,
    }
}

fn previous_month(month: &str) -> Option<String> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d").ok()?;
    let prev = first.checked_sub_months(Months::new(1))?;
    Some(prev.format("%Y-%m").to_string())
}
