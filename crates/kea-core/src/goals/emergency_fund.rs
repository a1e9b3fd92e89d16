//! Emergency fund goal
//!
//! Proposes a buffer of three months of expenses, contributed over a year.

use tracing::debug;

use crate::models::SmartGoal;

use super::{grade_contribution, GoalContext, GoalRule};

const MONTHS_OF_EXPENSES: f64 = 3.0;
const CONTRIBUTION_MONTHS: u32 = 12;

pub struct EmergencyFundRule;

impl GoalRule for EmergencyFundRule {
    fn id(&self) -> &'static str {
        "emergency_fund"
    }

    fn name(&self) -> &'static str {
        "Emergency Fund"
    }

    fn evaluate(&self, ctx: &GoalContext<'_>) -> Option<SmartGoal> {
        if ctx.avg_expenses <= 0.0 {
            return None;
        }

        let target = MONTHS_OF_EXPENSES * ctx.avg_expenses;
        let monthly = target / CONTRIBUTION_MONTHS as f64;
        let achievability = grade_contribution(monthly, ctx.disposable);
        debug!(target, monthly, ?achievability, "Emergency fund proposal");

        Some(SmartGoal {
            category: self.id().to_string(),
            description: format!(
                "Build a ${:.0} emergency fund covering 3 months of expenses",
                target
            ),
            target_amount: target,
            timeframe_months: CONTRIBUTION_MONTHS,
            achievability,
            rationale: format!(
                "Your average monthly spend is ${:.0}; setting aside ${:.0}/month reaches a 3-month buffer in a year.",
                ctx.avg_expenses, monthly
            ),
        })
    }
}
