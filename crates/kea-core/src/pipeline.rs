//! End-to-end import pipeline
//!
//! parse -> deduplicate -> classify -> optional categorizer boost -> persist.
//! Classification and dedup for one user must run serialized: dedup depends
//! on a consistent snapshot of already-accepted transactions, so concurrent
//! imports for the same store must not interleave accept decisions.

use std::sync::Arc;

use tracing::{info, warn};

use crate::categorizer::{Categorizer, BOOST_THRESHOLD};
use crate::classify::TransactionClassifier;
use crate::dedup::deduplicate;
use crate::error::Result;
use crate::models::{Category, ClassifiedTransaction, Confidence};
use crate::parse::UnifiedParser;
use crate::registry::BankRegistry;
use crate::store::TransactionStore;

/// What one file import did
#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub detected_bank: String,
    pub confidence: Confidence,
    /// Transactions extracted from the file
    pub parsed: usize,
    /// Transactions persisted after dedup
    pub accepted: usize,
    pub duplicates_skipped: usize,
    pub reversal_pairs: usize,
    pub warnings: Vec<String>,
}

pub struct Pipeline {
    registry: BankRegistry,
    store: Arc<dyn TransactionStore>,
    categorizer: Option<Arc<dyn Categorizer>>,
}

impl Pipeline {
    pub fn new(registry: BankRegistry, store: Arc<dyn TransactionStore>) -> Self {
        Self {
            registry,
            store,
            categorizer: None,
        }
    }

    pub fn with_categorizer(mut self, categorizer: Arc<dyn Categorizer>) -> Self {
        self.categorizer = Some(categorizer);
        self
    }

    pub fn registry(&self) -> &BankRegistry {
        &self.registry
    }

    /// Import one file's rows end to end.
    pub async fn import(
        &self,
        filename: &str,
        headers: &[String],
        rows: &[crate::models::RawRow],
    ) -> Result<ImportSummary> {
        let parser = UnifiedParser::new(&self.registry);
        let parse_result = parser.parse(filename, headers, rows);
        let parsed = parse_result.transactions.len();

        if parse_result.transactions.is_empty() {
            return Ok(ImportSummary {
                detected_bank: parse_result.detected_bank,
                confidence: parse_result.confidence,
                parsed: 0,
                accepted: 0,
                duplicates_skipped: 0,
                reversal_pairs: 0,
                warnings: parse_result.warnings,
            });
        }

        // Dedup against what the store already holds for this date range
        let from = parse_result
            .transactions
            .iter()
            .map(|t| t.date)
            .min()
            .expect("non-empty batch");
        let to = parse_result
            .transactions
            .iter()
            .map(|t| t.date)
            .max()
            .expect("non-empty batch");
        let existing = self.store.existing_signatures(from, to)?;
        let dedup = deduplicate(parse_result.transactions, &existing);

        let classifier = TransactionClassifier::new();
        let mut classified: Vec<ClassifiedTransaction> = dedup
            .unique
            .into_iter()
            .map(|tx| classifier.classify_one(tx))
            .collect();
        let pairs = classifier.pair_reversals(&mut classified);

        self.boost_low_confidence(&mut classified).await;

        self.store.save_transactions(&classified)?;

        info!(
            filename,
            bank = %parse_result.detected_bank,
            parsed,
            accepted = classified.len(),
            duplicates = dedup.duplicates_skipped,
            "Import complete"
        );

        Ok(ImportSummary {
            detected_bank: parse_result.detected_bank,
            confidence: parse_result.confidence,
            parsed,
            accepted: classified.len(),
            duplicates_skipped: dedup.duplicates_skipped,
            reversal_pairs: pairs.len(),
            warnings: parse_result.warnings,
        })
    }

    /// Consult the external categorizer for low-confidence `Other` results.
    ///
    /// Only upgrades: transfers, reversals, and confident heuristic matches
    /// are never overridden, and a failing categorizer leaves the heuristic
    /// result in place.
    async fn boost_low_confidence(&self, classified: &mut [ClassifiedTransaction]) {
        let categorizer = match &self.categorizer {
            Some(c) => c,
            None => return,
        };

        for tx in classified.iter_mut() {
            if tx.is_ignored || tx.category != Category::Other || tx.confidence >= BOOST_THRESHOLD
            {
                continue;
            }
            match categorizer.categorize(&tx.description, tx.amount).await {
                Ok(suggestion) if suggestion.confidence > tx.confidence => {
                    tx.category = suggestion.category;
                    tx.subcategory = suggestion.subcategory;
                    tx.confidence = suggestion.confidence;
                    tx.budget_group = suggestion.category.default_budget_group(tx.is_income);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(description = %tx.description, error = %e, "Categorizer failed, keeping heuristic result");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categorizer::{FailingCategorizer, MockCategorizer};
    use crate::models::RawRow;
    use crate::store::MemoryStore;

    fn asb_rows() -> (Vec<String>, Vec<RawRow>) {
        let headers: Vec<String> = ["Date", "Particulars", "Amount"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![
            RawRow::new(
                "asb.csv",
                vec![
                    ("Date".to_string(), "15/05/2024".to_string()),
                    ("Particulars".to_string(), "Uber Eats".to_string()),
                    ("Amount".to_string(), "-22.40".to_string()),
                ],
            ),
            RawRow::new(
                "asb.csv",
                vec![
                    ("Date".to_string(), "16/05/2024".to_string()),
                    ("Particulars".to_string(), "ACME Salary".to_string()),
                    ("Amount".to_string(), "1500.00".to_string()),
                ],
            ),
        ];
        (headers, rows)
    }

    #[tokio::test]
    async fn test_import_and_reimport() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(BankRegistry::default(), store.clone());

        let (headers, rows) = asb_rows();
        let first = pipeline.import("asb.csv", &headers, &rows).await.unwrap();
        assert_eq!(first.detected_bank, "ASB");
        assert_eq!(first.parsed, 2);
        assert_eq!(first.accepted, 2);
        assert_eq!(first.duplicates_skipped, 0);

        // Same file again: everything is a duplicate
        let second = pipeline.import("asb.csv", &headers, &rows).await.unwrap();
        assert_eq!(second.parsed, 2);
        assert_eq!(second.accepted, 0);
        assert_eq!(second.duplicates_skipped, 2);
        assert_eq!(store.all().len(), 2);
    }

    #[tokio::test]
    async fn test_categorizer_boosts_low_confidence_other() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(BankRegistry::default(), store.clone())
            .with_categorizer(Arc::new(MockCategorizer::new(Category::Dining, 0.9)));

        let headers: Vec<String> = ["Date", "Particulars", "Amount"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![RawRow::new(
            "asb.csv",
            vec![
                ("Date".to_string(), "15/05/2024".to_string()),
                ("Particulars".to_string(), "XZYW Ltd".to_string()),
                ("Amount".to_string(), "-12.00".to_string()),
            ],
        )];

        pipeline.import("asb.csv", &headers, &rows).await.unwrap();
        let saved = store.all();
        assert_eq!(saved[0].category, Category::Dining);
        assert_eq!(saved[0].confidence, 0.9);
    }

    #[tokio::test]
    async fn test_failing_categorizer_degrades_to_heuristics() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(BankRegistry::default(), store.clone())
            .with_categorizer(Arc::new(FailingCategorizer));

        let headers: Vec<String> = ["Date", "Particulars", "Amount"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let rows = vec![RawRow::new(
            "asb.csv",
            vec![
                ("Date".to_string(), "15/05/2024".to_string()),
                ("Particulars".to_string(), "XZYW Ltd".to_string()),
                ("Amount".to_string(), "-12.00".to_string()),
            ],
        )];

        let summary = pipeline.import("asb.csv", &headers, &rows).await.unwrap();
        assert_eq!(summary.accepted, 1);
        let saved = store.all();
        assert_eq!(saved[0].category, Category::Other);
        assert_eq!(saved[0].confidence, 0.5);
    }

    #[tokio::test]
    async fn test_confident_matches_are_not_overridden() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Pipeline::new(BankRegistry::default(), store.clone())
            .with_categorizer(Arc::new(MockCategorizer::new(Category::Shopping, 0.99)));

        let (headers, rows) = asb_rows();
        pipeline.import("asb.csv", &headers, &rows).await.unwrap();

        let saved = store.all();
        // Uber Eats stays dining, salary stays income
        assert_eq!(saved[0].category, Category::Dining);
        assert_eq!(saved[1].category, Category::Income);
    }
}
