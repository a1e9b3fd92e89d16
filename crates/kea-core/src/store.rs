//! Persistence seam
//!
//! The core never touches disk or network. A `TransactionStore` supplies
//! prior signatures for cross-batch dedup and accepts the final classified
//! batch; `MemoryStore` backs tests and the CLI's single-run mode.

use std::collections::HashSet;
use std::sync::Mutex;

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::ClassifiedTransaction;

pub trait TransactionStore: Send + Sync {
    /// Signatures of already-persisted transactions within a date range
    fn existing_signatures(&self, from: NaiveDate, to: NaiveDate) -> Result<HashSet<String>>;

    /// Persist an accepted batch
    fn save_transactions(&self, transactions: &[ClassifiedTransaction]) -> Result<()>;
}

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    transactions: Mutex<Vec<ClassifiedTransaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far
    pub fn all(&self) -> Vec<ClassifiedTransaction> {
        self.transactions
            .lock()
            .expect("store lock poisoned")
            .clone()
    }
}

impl TransactionStore for MemoryStore {
    fn existing_signatures(&self, from: NaiveDate, to: NaiveDate) -> Result<HashSet<String>> {
        let transactions = self
            .transactions
            .lock()
            .map_err(|_| Error::Store("store lock poisoned".to_string()))?;
        Ok(transactions
            .iter()
            .filter(|t| t.date >= from && t.date <= to)
            .map(|t| t.signature.clone())
            .collect())
    }

    fn save_transactions(&self, batch: &[ClassifiedTransaction]) -> Result<()> {
        let mut transactions = self
            .transactions
            .lock()
            .map_err(|_| Error::Store("store lock poisoned".to_string()))?;
        transactions.extend_from_slice(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TransactionClassifier;
    use crate::models::NormalizedTransaction;

    fn classified(date: &str, description: &str, amount: f64) -> ClassifiedTransaction {
        TransactionClassifier::new().classify_one(NormalizedTransaction {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: description.to_string(),
            amount,
            is_income: false,
            merchant: None,
            source_bank: "ASB".to_string(),
            raw_data: serde_json::json!({}),
        })
    }

    #[test]
    fn test_signatures_are_date_range_scoped() {
        let store = MemoryStore::new();
        store
            .save_transactions(&[
                classified("2024-04-15", "Countdown", 80.0),
                classified("2024-05-15", "Countdown", 90.0),
            ])
            .unwrap();

        let may = store
            .existing_signatures(
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 5, 31).unwrap(),
            )
            .unwrap();
        assert_eq!(may.len(), 1);
    }

    #[test]
    fn test_save_appends() {
        let store = MemoryStore::new();
        store
            .save_transactions(&[classified("2024-05-15", "Countdown", 80.0)])
            .unwrap();
        store
            .save_transactions(&[classified("2024-05-16", "New World", 40.0)])
            .unwrap();
        assert_eq!(store.all().len(), 2);
    }
}
