//! Extraction driven by a detected bank configuration

use tracing::debug;

use crate::extract::{extract_field, normalize_date, parse_amount};
use crate::models::NormalizedTransaction;

use super::{clamp_description, ParseContext, ParseStrategy, StrategyOutcome};
use crate::models::BankConfig;

/// Parses rows using a matched config's column aliases
pub struct ConfigDrivenStrategy {
    config: BankConfig,
}

impl ConfigDrivenStrategy {
    pub fn new(config: BankConfig) -> Self {
        Self { config }
    }
}

impl ParseStrategy for ConfigDrivenStrategy {
    fn name(&self) -> &'static str {
        "config_driven"
    }

    fn attempt(&self, ctx: &ParseContext<'_>) -> Option<StrategyOutcome> {
        let mut outcome = StrategyOutcome::default();
        let config = &self.config;

        for (index, row) in ctx.rows.iter().enumerate() {
            let row_no = index + 1;

            let date_raw = extract_field(row, &config.date_aliases);
            if date_raw.is_empty() {
                outcome
                    .warnings
                    .push(format!("row {}: missing date, skipped", row_no));
                continue;
            }
            let normalized = normalize_date(&date_raw);
            if normalized.fell_back_to_today {
                outcome.warnings.push(format!(
                    "row {}: unparseable date '{}', skipped",
                    row_no, date_raw
                ));
                continue;
            }

            let description_part = extract_field(row, &config.description_aliases);
            let reference_part = extract_field(row, &config.reference_aliases);
            let description = match (description_part.is_empty(), reference_part.is_empty()) {
                (false, false) => format!("{} - {}", description_part, reference_part),
                (false, true) => description_part,
                (true, false) => reference_part,
                (true, true) => {
                    outcome
                        .warnings
                        .push(format!("row {}: missing description, skipped", row_no));
                    continue;
                }
            };

            let debit_raw = extract_field(row, &config.debit_aliases);
            let credit_raw = extract_field(row, &config.credit_aliases);
            if !debit_raw.is_empty() && !credit_raw.is_empty() {
                // Silently picking one risks misclassifying direction
                outcome.warnings.push(format!(
                    "row {}: both debit ('{}') and credit ('{}') present, skipped",
                    row_no, debit_raw, credit_raw
                ));
                continue;
            }

            let signed = if !debit_raw.is_empty() {
                -parse_amount(&debit_raw).abs()
            } else if !credit_raw.is_empty() {
                parse_amount(&credit_raw).abs()
            } else {
                parse_amount(&extract_field(row, &config.amount_aliases))
            };

            if signed == 0.0 {
                outcome
                    .warnings
                    .push(format!("row {}: missing or zero amount, skipped", row_no));
                continue;
            }

            let merchant = {
                let value = extract_field(row, &config.merchant_aliases);
                if value.is_empty() {
                    None
                } else {
                    Some(value)
                }
            };

            outcome.transactions.push(NormalizedTransaction {
                date: normalized.date,
                description: clamp_description(&description),
                amount: signed.abs(),
                is_income: signed > 0.0,
                merchant,
                source_bank: config.name.clone(),
                raw_data: row.to_json(),
            });
        }

        debug!(
            bank = %config.name,
            parsed = outcome.transactions.len(),
            skipped = outcome.warnings.len(),
            "Config-driven extraction complete"
        );
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;
    use crate::registry::builtin_nz_configs;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        RawRow::new(
            "test.csv",
            cells
                .iter()
                .map(|(h, v)| (h.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn attempt(config_name: &str, rows: Vec<RawRow>) -> StrategyOutcome {
        let config = builtin_nz_configs()
            .into_iter()
            .find(|c| c.name == config_name)
            .unwrap();
        let headers: Vec<String> = rows
            .first()
            .map(|r| r.headers().map(|h| h.to_string()).collect())
            .unwrap_or_default();
        let ctx = ParseContext {
            filename: "test.csv",
            headers: &headers,
            rows: &rows,
        };
        ConfigDrivenStrategy::new(config).attempt(&ctx).unwrap()
    }

    #[test]
    fn test_description_joins_reference() {
        let outcome = attempt(
            "ASB",
            vec![row(&[
                ("Date", "15/05/2024"),
                ("Particulars", "Uber Eats"),
                ("Reference", "INV-42"),
                ("Amount", "-22.40"),
            ])],
        );
        assert_eq!(outcome.transactions[0].description, "Uber Eats - INV-42");
    }

    #[test]
    fn test_debit_credit_columns() {
        let outcome = attempt(
            "Kiwibank",
            vec![
                row(&[
                    ("Date", "01/05/2024"),
                    ("Memo/Description", "Countdown"),
                    ("Amount (debit)", "55.10"),
                    ("Amount (credit)", ""),
                ]),
                row(&[
                    ("Date", "02/05/2024"),
                    ("Memo/Description", "Salary"),
                    ("Amount (debit)", ""),
                    ("Amount (credit)", "1800.00"),
                ]),
            ],
        );

        assert_eq!(outcome.transactions.len(), 2);
        assert!(!outcome.transactions[0].is_income);
        assert_eq!(outcome.transactions[0].amount, 55.10);
        assert!(outcome.transactions[1].is_income);
        assert_eq!(outcome.transactions[1].amount, 1800.00);
    }

    #[test]
    fn test_both_debit_and_credit_is_a_row_error() {
        let outcome = attempt(
            "Kiwibank",
            vec![row(&[
                ("Date", "01/05/2024"),
                ("Memo/Description", "Odd row"),
                ("Amount (debit)", "10.00"),
                ("Amount (credit)", "10.00"),
            ])],
        );

        assert!(outcome.transactions.is_empty());
        assert!(outcome.warnings[0].contains("both debit"));
    }

    #[test]
    fn test_missing_description_skips_row() {
        let outcome = attempt(
            "ASB",
            vec![row(&[
                ("Date", "01/05/2024"),
                ("Particulars", ""),
                ("Amount", "-5.00"),
            ])],
        );
        assert!(outcome.transactions.is_empty());
        assert!(outcome.warnings[0].contains("missing description"));
    }

    #[test]
    fn test_raw_data_is_retained() {
        let outcome = attempt(
            "ASB",
            vec![row(&[
                ("Date", "15/05/2024"),
                ("Particulars", "Uber Eats"),
                ("Amount", "-22.40"),
            ])],
        );
        assert_eq!(outcome.transactions[0].raw_data["Particulars"], "Uber Eats");
    }
}
