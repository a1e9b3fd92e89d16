//! Layered statement parsing
//!
//! Strategies are tried in a fixed order and the orchestrator short-circuits
//! on the first one producing at least one transaction:
//!
//! 1. Config-driven extraction, when the registry detects a bank format
//! 2. Intelligent header/shape inference for unknown formats
//! 3. Positional last-resort parsing
//!
//! Every stage appends non-fatal issues to a shared warnings list instead of
//! raising: a malformed row in a 2,000-row statement must not abort the
//! remaining 1,999.

mod config_driven;
mod intelligent;
mod positional;

pub use config_driven::ConfigDrivenStrategy;
pub use intelligent::{ColumnMapping, IntelligentStrategy};
pub use positional::PositionalStrategy;

use tracing::{debug, info};

use crate::models::{Confidence, NormalizedTransaction, ParseResult, RawRow};
use crate::registry::BankRegistry;

/// Input handed to each parsing strategy
pub struct ParseContext<'a> {
    pub filename: &'a str,
    pub headers: &'a [String],
    pub rows: &'a [RawRow],
}

/// Transactions plus row-level warnings from one strategy attempt
#[derive(Debug, Default)]
pub struct StrategyOutcome {
    pub transactions: Vec<NormalizedTransaction>,
    pub warnings: Vec<String>,
}

/// A parsing strategy in the fallback chain.
///
/// `attempt` returns None when the strategy cannot apply at all; an outcome
/// with zero transactions means it applied but extracted nothing, which also
/// sends the orchestrator to the next strategy.
pub trait ParseStrategy {
    fn name(&self) -> &'static str;
    fn attempt(&self, ctx: &ParseContext<'_>) -> Option<StrategyOutcome>;
}

/// Orchestrates detection and the strategy chain, annotating the result with
/// a confidence tier.
pub struct UnifiedParser<'a> {
    registry: &'a BankRegistry,
}

impl<'a> UnifiedParser<'a> {
    pub fn new(registry: &'a BankRegistry) -> Self {
        Self { registry }
    }

    /// Parse one file's rows into normalized transactions.
    ///
    /// Confidence tiers: `high` when a detected config parses, `medium` when
    /// a config matched but the intelligent fallback had to take over, `low`
    /// otherwise.
    pub fn parse(&self, filename: &str, headers: &[String], rows: &[RawRow]) -> ParseResult {
        if rows.is_empty() {
            return ParseResult::empty(vec!["no data to parse".to_string()]);
        }

        let mut warnings = Vec::new();
        let ctx = ParseContext {
            filename,
            headers,
            rows,
        };

        let detection = self.registry.detect(filename, headers, rows);
        if let Some(ref detection) = detection {
            if !detection.ambiguous_with.is_empty() {
                warnings.push(format!(
                    "ambiguous format match: using '{}', but {} also matched",
                    detection.config.name,
                    detection.ambiguous_with.join(", ")
                ));
            }
        }

        // Stage 1: config-driven extraction
        if let Some(detection) = &detection {
            let strategy = ConfigDrivenStrategy::new(detection.config.clone());
            if let Some(outcome) = strategy.attempt(&ctx) {
                warnings.extend(outcome.warnings);
                if !outcome.transactions.is_empty() {
                    info!(
                        bank = %detection.config.name,
                        count = outcome.transactions.len(),
                        "Parsed with bank config"
                    );
                    return ParseResult {
                        transactions: outcome.transactions,
                        detected_bank: detection.config.name.clone(),
                        confidence: Confidence::High,
                        warnings,
                    };
                }
                warnings.push(format!(
                    "bank config '{}' matched but extracted no transactions",
                    detection.config.name
                ));
            }
        }

        // Stage 2: intelligent header/shape inference
        let strategy = IntelligentStrategy::new();
        if let Some(outcome) = strategy.attempt(&ctx) {
            warnings.extend(outcome.warnings);
            if !outcome.transactions.is_empty() {
                let confidence = if detection.is_some() {
                    Confidence::Medium
                } else {
                    Confidence::Low
                };
                debug!(
                    count = outcome.transactions.len(),
                    confidence = %confidence,
                    "Parsed with intelligent fallback"
                );
                return ParseResult {
                    transactions: outcome.transactions,
                    detected_bank: detection
                        .map(|d| d.config.name)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    confidence,
                    warnings,
                };
            }
        }

        // Stage 3: positional last resort
        let strategy = PositionalStrategy::new();
        warnings.push("positional fallback used; results may be incomplete".to_string());
        if let Some(outcome) = strategy.attempt(&ctx) {
            warnings.extend(outcome.warnings);
            if !outcome.transactions.is_empty() {
                return ParseResult {
                    transactions: outcome.transactions,
                    detected_bank: "Unknown".to_string(),
                    confidence: Confidence::Low,
                    warnings,
                };
            }
        }

        warnings.push("no parsing strategy extracted any transactions".to_string());
        ParseResult::empty(warnings)
    }
}

/// Truncate a description to the stored maximum
pub(crate) fn clamp_description(description: &str) -> String {
    let trimmed = description.trim();
    if trimmed.len() <= crate::models::MAX_DESCRIPTION_LEN {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .take(crate::models::MAX_DESCRIPTION_LEN)
        .collect()
}
