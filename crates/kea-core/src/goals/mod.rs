//! Goal recommendation
//!
//! Each rule looks at recent monthly budgets and may propose one SMART goal.
//! Rules are independent and ordered by priority; the engine runs them in
//! order and caps the output. A negative-cash-flow period short-circuits
//! everything into a single advisory goal.

mod emergency_fund;
mod engine;
mod expense_reduction;
mod savings_rate;

pub use emergency_fund::EmergencyFundRule;
pub use engine::{recommend, RecommendationEngine};
pub use expense_reduction::ExpenseReductionRule;
pub use savings_rate::SavingsRateRule;

use crate::models::{Achievability, MonthlyBudget, SmartGoal};

/// Shared per-run figures derived from the budget window
pub struct GoalContext<'a> {
    pub budgets: &'a [MonthlyBudget],
    /// Mean monthly income across the window
    pub avg_income: f64,
    /// Mean monthly expenses across the window
    pub avg_expenses: f64,
    /// Mean monthly income minus expenses
    pub disposable: f64,
}

impl<'a> GoalContext<'a> {
    pub fn new(budgets: &'a [MonthlyBudget]) -> Self {
        let months = budgets.len().max(1) as f64;
        let avg_income = budgets.iter().map(|b| b.total_income).sum::<f64>() / months;
        let avg_expenses = budgets.iter().map(|b| b.total_expenses).sum::<f64>() / months;
        Self {
            budgets,
            avg_income,
            avg_expenses,
            disposable: avg_income - avg_expenses,
        }
    }
}

/// One goal-proposing rule
pub trait GoalRule {
    /// Stable identifier, used as the goal category
    fn id(&self) -> &'static str;
    /// Human-readable rule name
    fn name(&self) -> &'static str;
    /// Propose a goal for this window, or decline
    fn evaluate(&self, ctx: &GoalContext<'_>) -> Option<SmartGoal>;
}

/// Grade a required monthly contribution against disposable income.
pub(crate) fn grade_contribution(monthly: f64, disposable: f64) -> Achievability {
    if disposable <= 0.0 {
        return Achievability::Unrealistic;
    }
    let share = monthly / disposable;
    if share <= 0.2 {
        Achievability::Easy
    } else if share <= 0.4 {
        Achievability::Moderate
    } else if share <= 0.7 {
        Achievability::Challenging
    } else {
        Achievability::Unrealistic
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contribution_ladder() {
        assert_eq!(grade_contribution(100.0, 1000.0), Achievability::Easy);
        assert_eq!(grade_contribution(300.0, 1000.0), Achievability::Moderate);
        assert_eq!(grade_contribution(600.0, 1000.0), Achievability::Challenging);
        assert_eq!(grade_contribution(900.0, 1000.0), Achievability::Unrealistic);
        assert_eq!(grade_contribution(1.0, 0.0), Achievability::Unrealistic);
    }
}
