//! Savings rate goal
//!
//! When the average savings rate over the window is below 20%, proposes
//! lifting monthly savings to 20% of income over twelve months.

use tracing::debug;

use crate::models::SmartGoal;

use super::{grade_contribution, GoalContext, GoalRule};

const TARGET_RATE: f64 = 20.0;
const HORIZON_MONTHS: u32 = 12;

pub struct SavingsRateRule;

impl GoalRule for SavingsRateRule {
    fn id(&self) -> &'static str {
        "savings_rate"
    }

    fn name(&self) -> &'static str {
        "Savings Rate"
    }

    fn evaluate(&self, ctx: &GoalContext<'_>) -> Option<SmartGoal> {
        if ctx.avg_income <= 0.0 {
            return None;
        }

        let months = ctx.budgets.len().max(1) as f64;
        let avg_rate = ctx.budgets.iter().map(|b| b.savings_rate).sum::<f64>() / months;
        if avg_rate >= TARGET_RATE {
            return None;
        }

        let target_monthly_savings = TARGET_RATE / 100.0 * ctx.avg_income;
        let extra_needed = (target_monthly_savings - ctx.disposable).max(0.0);
        let achievability = grade_contribution(extra_needed, ctx.disposable);
        debug!(avg_rate, target_monthly_savings, "Savings rate proposal");

        Some(SmartGoal {
            category: self.id().to_string(),
            description: format!(
                "Raise monthly savings to ${:.0} (20% of income)",
                target_monthly_savings
            ),
            target_amount: target_monthly_savings * HORIZON_MONTHS as f64,
            timeframe_months: HORIZON_MONTHS,
            achievability,
            rationale: format!(
                "You currently save {:.1}% of income; 20% is a common baseline for long-term stability.",
                avg_rate
            ),
        })
    }
}
