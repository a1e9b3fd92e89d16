//! Duplicate detection via content signatures
//!
//! A transaction's signature hashes its date, lowercased description, and
//! amount rounded to cents. Dedup is two-level: against signatures already
//! persisted (supplied by the caller, scoped to the batch's date range) and
//! against earlier transactions in the same batch. Exact matching only;
//! fuzzy matching belongs to reversal pairing, which has different semantics.

use std::collections::HashSet;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::models::NormalizedTransaction;

/// Hex SHA-256 over `date|description|amount`, description lowercased so a
/// bank's casing drift between exports does not defeat the match.
pub fn signature(tx: &NormalizedTransaction) -> String {
    let mut hasher = Sha256::new();
    hasher.update(
        format!(
            "{}|{}|{:.2}",
            tx.date,
            tx.description.to_lowercase(),
            tx.signed_amount()
        )
        .as_bytes(),
    );
    hex::encode(hasher.finalize())
}

/// Accepted transactions plus the count of duplicates dropped
#[derive(Debug, Default)]
pub struct DedupOutcome {
    pub unique: Vec<NormalizedTransaction>,
    pub duplicates_skipped: usize,
}

/// Filter a batch against prior signatures and against itself.
pub fn deduplicate(
    candidates: Vec<NormalizedTransaction>,
    existing: &HashSet<String>,
) -> DedupOutcome {
    let mut seen: HashSet<String> = existing.clone();
    let mut outcome = DedupOutcome::default();

    for tx in candidates {
        let sig = signature(&tx);
        if seen.insert(sig) {
            outcome.unique.push(tx);
        } else {
            debug!(description = %tx.description, date = %tx.date, "Skipping duplicate");
            outcome.duplicates_skipped += 1;
        }
    }

    outcome
}
