//! Last-resort positional parsing
//!
//! No headers, no config, no inference: scan each row left to right and take
//! the first date-shaped cell as the date, the first money-shaped cell as the
//! amount, and everything else as the description.

use crate::extract::{looks_like_date, looks_like_number, normalize_date, parse_amount};
use crate::models::NormalizedTransaction;

use super::{clamp_description, ParseContext, ParseStrategy, StrategyOutcome};

pub struct PositionalStrategy;

impl PositionalStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PositionalStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseStrategy for PositionalStrategy {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn attempt(&self, ctx: &ParseContext<'_>) -> Option<StrategyOutcome> {
        let mut outcome = StrategyOutcome::default();

        for (index, row) in ctx.rows.iter().enumerate() {
            let row_no = index + 1;

            let mut date = None;
            let mut signed = None;
            let mut description_parts: Vec<&str> = Vec::new();

            for value in row.values() {
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                if date.is_none() && looks_like_date(value) {
                    date = Some(normalize_date(value).date);
                } else if signed.is_none() && looks_like_number(value) {
                    let parsed = parse_amount(value);
                    if parsed != 0.0 {
                        signed = Some(parsed);
                    }
                } else {
                    description_parts.push(value);
                }
            }

            let (date, signed) = match (date, signed) {
                (Some(d), Some(a)) => (d, a),
                _ => {
                    outcome.warnings.push(format!(
                        "row {}: could not locate both a date and an amount, skipped",
                        row_no
                    ));
                    continue;
                }
            };

            let description = description_parts.join(" ");
            if description.is_empty() {
                outcome
                    .warnings
                    .push(format!("row {}: no usable description, skipped", row_no));
                continue;
            }

            outcome.transactions.push(NormalizedTransaction {
                date,
                description: clamp_description(&description),
                amount: signed.abs(),
                is_income: signed > 0.0,
                merchant: None,
                source_bank: "Unknown".to_string(),
                raw_data: row.to_json(),
            });
        }

        Some(outcome)
    }
}
