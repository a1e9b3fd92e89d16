//! Recommendation engine

use tracing::{debug, info};

use crate::models::{Achievability, MonthlyBudget, SmartGoal};

use super::{
    EmergencyFundRule, ExpenseReductionRule, GoalContext, GoalRule, SavingsRateRule,
};

const MAX_GOALS: usize = 3;

/// Runs registered goal rules in priority order
pub struct RecommendationEngine {
    rules: Vec<Box<dyn GoalRule>>,
}

impl Default for RecommendationEngine {
    fn default() -> Self {
        Self {
            rules: vec![
                Box::new(EmergencyFundRule),
                Box::new(SavingsRateRule),
                Box::new(ExpenseReductionRule),
            ],
        }
    }
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with no rules, for composing a custom set
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, rule: Box<dyn GoalRule>) {
        debug!(rule = rule.id(), "Registering goal rule");
        self.rules.push(rule);
    }

    /// Propose up to three goals from a window of monthly budgets.
    ///
    /// Negative average cash flow short-circuits into a single advisory
    /// goal: there is no point proposing savings targets the user cannot
    /// fund.
    pub fn recommend(&self, budgets: &[MonthlyBudget]) -> Vec<SmartGoal> {
        if budgets.is_empty() {
            return Vec::new();
        }

        let ctx = GoalContext::new(budgets);
        if ctx.disposable <= 0.0 {
            info!(
                disposable = ctx.disposable,
                "Negative cash flow, returning advisory goal only"
            );
            return vec![cash_flow_advisory(&ctx)];
        }

        let mut goals: Vec<SmartGoal> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(&ctx))
            .collect();
        goals.truncate(MAX_GOALS);

        info!(months = budgets.len(), goals = goals.len(), "Generated goal recommendations");
        goals
    }
}

/// Convenience wrapper over the default rule set
pub fn recommend(budgets: &[MonthlyBudget]) -> Vec<SmartGoal> {
    RecommendationEngine::new().recommend(budgets)
}

fn cash_flow_advisory(ctx: &GoalContext<'_>) -> SmartGoal {
    SmartGoal {
        category: "cash_flow".to_string(),
        description: "Bring monthly cash flow back to positive before setting savings goals"
            .to_string(),
        target_amount: -ctx.disposable,
        timeframe_months: 1,
        achievability: Achievability::Challenging,
        rationale: format!(
            "Expenses exceed income by ${:.0}/month on average; savings goals are not fundable until that gap closes.",
            -ctx.disposable
        ),
    }
}
