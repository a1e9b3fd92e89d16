//! Intelligent fallback parsing for unknown statement formats
//!
//! Infers column roles from header-name keyword families first, and from the
//! shape of the data itself when headers give nothing away.

use regex::Regex;
use tracing::debug;

use crate::extract::{looks_like_date, looks_like_number, normalize_date, parse_amount};
use crate::models::NormalizedTransaction;

use super::{clamp_description, ParseContext, ParseStrategy, StrategyOutcome};

/// Amounts at or above this are assumed to be mis-picked identifiers
/// (account numbers, card numbers), not money.
const AMOUNT_SANITY_CEILING: f64 = 1_000_000.0;

const DATE_KEYWORDS: &[&str] = &["date", "when", "posted", "time"];
const DESCRIPTION_KEYWORDS: &[&str] = &[
    "description",
    "details",
    "particulars",
    "narrative",
    "payee",
    "memo",
    "merchant",
    "other party",
    "transaction",
];
const AMOUNT_KEYWORDS: &[&str] = &["amount", "value", "total"];
const DEBIT_KEYWORDS: &[&str] = &["debit", "withdrawal", "money out", "paid out"];
const CREDIT_KEYWORDS: &[&str] = &["credit", "deposit", "money in", "paid in"];
const BALANCE_KEYWORDS: &[&str] = &["balance", "bal"];
const REFERENCE_KEYWORDS: &[&str] = &["reference", "ref", "code", "analysis"];

/// Column indices assigned to each field role
#[derive(Debug, Default, Clone)]
pub struct ColumnMapping {
    pub date: Vec<usize>,
    pub description: Vec<usize>,
    pub amount: Vec<usize>,
    pub debit: Vec<usize>,
    pub credit: Vec<usize>,
    pub balance: Vec<usize>,
    pub reference: Vec<usize>,
}

impl ColumnMapping {
    /// Score every header against the keyword families; substring
    /// containment counts in either direction.
    pub fn from_headers(headers: &[String]) -> Self {
        let mut mapping = Self::default();

        for (index, header) in headers.iter().enumerate() {
            let h = header.to_lowercase();
            let matches = |family: &[&str]| {
                family
                    .iter()
                    .any(|kw| h.contains(kw) || (!h.is_empty() && kw.contains(h.as_str())))
            };

            // Debit/credit before amount: "Amount (debit)" must land on the
            // directional column, not the generic one.
            if matches(DEBIT_KEYWORDS) {
                mapping.debit.push(index);
            } else if matches(CREDIT_KEYWORDS) {
                mapping.credit.push(index);
            } else if matches(BALANCE_KEYWORDS) {
                mapping.balance.push(index);
            } else if matches(AMOUNT_KEYWORDS) {
                mapping.amount.push(index);
            } else if matches(DATE_KEYWORDS) {
                mapping.date.push(index);
            } else if matches(DESCRIPTION_KEYWORDS) {
                mapping.description.push(index);
            } else if matches(REFERENCE_KEYWORDS) {
                mapping.reference.push(index);
            }
        }

        // Positional fallback per empty family: 0=date, 1=description, 2=amount
        if mapping.date.is_empty() && !headers.is_empty() {
            mapping.date.push(0);
        }
        if mapping.description.is_empty() && headers.len() > 1 {
            mapping.description.push(1);
        }
        if mapping.amount.is_empty()
            && mapping.debit.is_empty()
            && mapping.credit.is_empty()
            && headers.len() > 2
        {
            mapping.amount.push(2);
        }

        mapping
    }
}

/// Header/shape-inference fallback parser
pub struct IntelligentStrategy {
    date_shape: Regex,
}

impl IntelligentStrategy {
    pub fn new() -> Self {
        Self {
            // DD/MM/YYYY-ish and ISO-ish shapes
            date_shape: Regex::new(r"^\d{1,4}[-/.]\d{1,2}[-/.]\d{1,4}$")
                .expect("static regex compiles"),
        }
    }

    fn extract_date(
        &self,
        row: &crate::models::RawRow,
        mapping: &ColumnMapping,
    ) -> Option<chrono::NaiveDate> {
        // First non-empty value from mapped date columns
        for &index in &mapping.date {
            if let Some(value) = row.value_at(index) {
                if !value.trim().is_empty() {
                    let normalized = normalize_date(value);
                    if !normalized.fell_back_to_today {
                        return Some(normalized.date);
                    }
                }
            }
        }

        // Else first date-shaped value anywhere in the row
        for value in row.values() {
            if self.date_shape.is_match(value.trim()) {
                let normalized = normalize_date(value);
                if !normalized.fell_back_to_today {
                    return Some(normalized.date);
                }
            }
        }

        None
    }

    fn extract_description(
        &self,
        row: &crate::models::RawRow,
        mapping: &ColumnMapping,
    ) -> String {
        // Concatenation of all matched description columns
        let parts: Vec<&str> = mapping
            .description
            .iter()
            .filter_map(|&i| row.value_at(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        if !parts.is_empty() {
            return parts.join(" ");
        }

        // Fall back to reference columns
        let refs: Vec<&str> = mapping
            .reference
            .iter()
            .filter_map(|&i| row.value_at(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect();
        if !refs.is_empty() {
            return refs.join(" ");
        }

        // Last resort: every cell that is neither numeric nor date-shaped
        row.values()
            .map(str::trim)
            .filter(|v| !v.is_empty() && !looks_like_number(v) && !looks_like_date(v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Signed amount for the row, or an Err carrying a row warning
    fn extract_amount(
        &self,
        row: &crate::models::RawRow,
        mapping: &ColumnMapping,
    ) -> Result<f64, String> {
        // First plausible value among amount columns
        for &index in &mapping.amount {
            if let Some(value) = row.value_at(index) {
                let parsed = parse_amount(value);
                if parsed != 0.0 && parsed.abs() < AMOUNT_SANITY_CEILING {
                    return Ok(parsed);
                }
            }
        }

        // Derive from debit/credit columns
        let debit = mapping
            .debit
            .iter()
            .filter_map(|&i| row.value_at(i))
            .map(parse_amount)
            .find(|v| *v != 0.0);
        let credit = mapping
            .credit
            .iter()
            .filter_map(|&i| row.value_at(i))
            .map(parse_amount)
            .find(|v| *v != 0.0);

        match (debit, credit) {
            (Some(d), Some(c)) => {
                return Err(format!(
                    "both debit ({}) and credit ({}) present",
                    d, c
                ))
            }
            (Some(d), None) => return Ok(-d.abs()),
            (None, Some(c)) => return Ok(c.abs()),
            (None, None) => {}
        }

        // First numeric-looking value in the row under the sanity ceiling,
        // skipping balance columns which are running totals, not amounts.
        for (index, value) in row.values().enumerate() {
            if mapping.balance.contains(&index) || mapping.date.contains(&index) {
                continue;
            }
            if looks_like_number(value) {
                let parsed = parse_amount(value);
                if parsed != 0.0 && parsed.abs() < AMOUNT_SANITY_CEILING {
                    return Ok(parsed);
                }
            }
        }

        Err("no amount found".to_string())
    }
}

impl Default for IntelligentStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseStrategy for IntelligentStrategy {
    fn name(&self) -> &'static str {
        "intelligent_fallback"
    }

    fn attempt(&self, ctx: &ParseContext<'_>) -> Option<StrategyOutcome> {
        if ctx.headers.is_empty() {
            return None;
        }

        let mapping = ColumnMapping::from_headers(ctx.headers);
        debug!(?mapping, "Inferred column mapping");

        let mut outcome = StrategyOutcome::default();

        for (index, row) in ctx.rows.iter().enumerate() {
            let row_no = index + 1;

            let date = match self.extract_date(row, &mapping) {
                Some(date) => date,
                None => {
                    outcome
                        .warnings
                        .push(format!("row {}: no usable date, skipped", row_no));
                    continue;
                }
            };

            let description = self.extract_description(row, &mapping);
            if description.is_empty() {
                outcome
                    .warnings
                    .push(format!("row {}: no usable description, skipped", row_no));
                continue;
            }

            let signed = match self.extract_amount(row, &mapping) {
                Ok(amount) => amount,
                Err(reason) => {
                    outcome
                        .warnings
                        .push(format!("row {}: {}, skipped", row_no, reason));
                    continue;
                }
            };

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
