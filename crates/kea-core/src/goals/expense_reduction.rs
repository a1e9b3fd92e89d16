//! Top-expense reduction goal
//!
//! When the largest expense category in the most recent month is substantial,
//! proposes trimming it by 15% over three months.

use tracing::debug;

use crate::models::SmartGoal;

use super::{grade_contribution, GoalContext, GoalRule};

const MINIMUM_CATEGORY_SPEND: f64 = 200.0;
const REDUCTION_SHARE: f64 = 0.15;
const HORIZON_MONTHS: u32 = 3;

pub struct ExpenseReductionRule;

impl GoalRule for ExpenseReductionRule {
    fn id(&self) -> &'static str {
        "expense_reduction"
    }

    fn name(&self) -> &'static str {
        "Expense Reduction"
    }

    fn evaluate(&self, ctx: &GoalContext<'_>) -> Option<SmartGoal> {
        let latest = ctx.budgets.last()?;
        let (category, amount) = latest.insights.top_expense_categories.first()?;
        if *amount <= MINIMUM_CATEGORY_SPEND {
            return None;
        }

        let monthly_cut = REDUCTION_SHARE * amount;
        let achievability = grade_contribution(monthly_cut, ctx.disposable + monthly_cut);
        debug!(category = %category, amount, monthly_cut, "Expense reduction proposal");

        Some(SmartGoal {
            category: self.id().to_string(),
            description: format!(
                "Cut {} spending by 15% (${:.0}/month)",
                category, monthly_cut
            ),
            target_amount: monthly_cut * HORIZON_MONTHS as f64,
            timeframe_months: HORIZON_MONTHS,
            achievability,
            rationale: format!(
                "{} was your largest expense category last month at ${:.0}.",
                category, amount
            ),
        })
    }
}
