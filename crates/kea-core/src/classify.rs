//! Transaction classification
//!
//! Per-transaction heuristics run in a fixed order: reversal patterns, then
//! transfer patterns, then income or expense keyword families depending on
//! direction. Reversal and transfer checks run first so a refunded grocery
//! charge is never counted as an expense and again as income.
//!
//! Reversal-pair detection is the one cross-transaction step: it matches
//! charge-and-refund cycles across the batch and marks both sides ignored.

use chrono::Duration;
use regex::Regex;
use tracing::debug;

use crate::models::{Category, ClassifiedTransaction, NormalizedTransaction};
use crate::similarity::normalized_similarity;

/// Max day gap between the two sides of a reversal pair
const REVERSAL_WINDOW_DAYS: i64 = 7;
/// Amount magnitudes must agree within one cent
const REVERSAL_AMOUNT_TOLERANCE: f64 = 0.01;
/// Minimum normalized description similarity for a pair
const REVERSAL_SIMILARITY_THRESHOLD: f64 = 0.8;

const REVERSAL_PATTERNS: &[&str] = &[
    "refund",
    "reversal",
    "reversed",
    "correction",
    "chargeback",
    "returned payment",
    "rtn",
];

const TRANSFER_PATTERNS: &[&str] = &[
    "transfer",
    "tfr",
    "automatic payment",
    "autopay",
    "standing order",
    "to savings",
    "from savings",
    "internal",
];

// Applied only to round amounts over the transfer threshold
const WEAK_TRANSFER_PATTERNS: &[&str] = &["payment", "internet banking", "online banking"];

const ROUND_TRANSFER_MINIMUM: f64 = 500.0;

const INCOME_FAMILIES: &[(&str, &[&str])] = &[
    ("salary", &["salary", "wages", "payroll", "fortnightly pay"]),
    (
        "government",
        &[
            "ird",
            "winz",
            "work and income",
            "working for families",
            "studylink",
            "benefit",
        ],
    ),
    (
        "investment",
        &["dividend", "interest", "sharesies", "investnow", "distribution"],
    ),
    ("business", &["invoice", "stripe", "paypal", "business income"]),
    ("rental", &["rent received", "rental income", "tenant", "bond refund"]),
];

const EXPENSE_FAMILIES: &[(Category, &[&str])] = &[
    (
        Category::Housing,
        &["rent", "mortgage", "body corporate", "rates", "landlord"],
    ),
    (
        Category::Utilities,
        &[
            "electricity",
            "power",
            "contact energy",
            "genesis",
            "mercury",
            "meridian",
            "spark",
            "vodafone",
            "one nz",
            "2degrees",
            "slingshot",
            "broadband",
            "watercare",
        ],
    ),
    (
        Category::Groceries,
        &[
            "countdown",
            "woolworths",
            "pak'nsave",
            "paknsave",
            "pak n save",
            "new world",
            "four square",
            "fresh choice",
            "supermarket",
        ],
    ),
    (
        Category::Dining,
        &[
            "uber eats",
            "ubereats",
            "delivereasy",
            "restaurant",
            "cafe",
            "coffee",
            "mcdonald",
            "kfc",
            "burger",
            "pizza",
            "sushi",
            "takeaway",
            "bakery",
        ],
    ),
    (
        Category::Transport,
        &[
            "z energy",
            "bp connect",
            "caltex",
            "mobil",
            "gull",
            "fuel",
            "petrol",
            "at hop",
            "uber",
            "taxi",
            "parking",
            "vtnz",
        ],
    ),
    (
        Category::Healthcare,
        &[
            "pharmacy",
            "chemist",
            "unichem",
            "life pharmacy",
            "doctor",
            "medical",
            "dental",
            "hospital",
            "physio",
        ],
    ),
    (
        Category::Subscriptions,
        &[
            "netflix",
            "spotify",
            "disney",
            "neon",
            "youtube premium",
            "apple.com/bill",
            "icloud",
            "subscription",
        ],
    ),
    (
        Category::Entertainment,
        &[
            "cinema",
            "hoyts",
            "event cinemas",
            "ticketek",
            "ticketmaster",
            "steam",
            "playstation",
            "xbox",
            "movie",
        ],
    ),
    (
        Category::Shopping,
        &[
            "the warehouse",
            "kmart",
            "farmers",
            "briscoes",
            "mitre 10",
            "bunnings",
            "trade me",
            "trademe",
            "amazon",
            "noel leeming",
        ],
    ),
];

/// A single reversal pair, by index into the classified batch
pub type ReversalPair = (usize, usize);

/// Keyword-family classifier with a compiled NZ account-number matcher
pub struct TransactionClassifier {
    account_number: Regex,
}

impl Default for TransactionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionClassifier {
    pub fn new() -> Self {
        Self {
            // NZ bank account format: BB-bbbb-AAAAAAA-SSS
            account_number: Regex::new(r"\d{2}-\d{4}-\d{7}-\d{3}")
                .expect("static regex compiles"),
        }
    }

    /// Classify a batch, then resolve reversal pairs across it.
    pub fn classify(&self, transactions: Vec<NormalizedTransaction>) -> Vec<ClassifiedTransaction> {
        let mut classified: Vec<ClassifiedTransaction> = transactions
            .into_iter()
            .map(|tx| self.classify_one(tx))
            .collect();
        let pairs = self.pair_reversals(&mut classified);
        debug!(
            count = classified.len(),
            reversal_pairs = pairs.len(),
            "Classified batch"
        );
        classified
    }

    /// Classify a single transaction without cross-batch context.
    pub fn classify_one(&self, tx: NormalizedTransaction) -> ClassifiedTransaction {
        let haystack = match &tx.merchant {
            Some(merchant) => format!("{} {}", tx.description, merchant).to_lowercase(),
            None => tx.description.to_lowercase(),
        };

        let (category, subcategory, is_transfer, is_reversal, confidence) =
            if contains_any(&haystack, REVERSAL_PATTERNS) {
                (Category::Reversal, None, false, true, 0.95)
            } else if self.is_transfer(&haystack, &tx) {
                (Category::Transfer, None, true, false, 0.9)
            } else if tx.is_income {
                match INCOME_FAMILIES
                    .iter()
                    .find(|(_, keywords)| contains_any(&haystack, keywords))
                {
                    Some((family, _)) => {
                        (Category::Income, Some(family.to_string()), false, false, 0.85)
                    }
                    None => (Category::Income, None, false, false, 0.5),
                }
            } else {
                match EXPENSE_FAMILIES
                    .iter()
                    .find(|(_, keywords)| contains_any(&haystack, keywords))
                {
                    Some((category, _)) => (*category, None, false, false, 0.85),
                    None => (Category::Other, None, false, false, 0.5),
                }
            };

        let is_ignored = is_transfer || is_reversal;
        let budget_group = category.default_budget_group(tx.is_income);
        let month_year = tx.month_year();
        let signature = crate::dedup::signature(&tx);

        ClassifiedTransaction {
            date: tx.date,
            description: tx.description,
            amount: tx.amount,
            is_income: if is_transfer { false } else { tx.is_income },
            merchant: tx.merchant,
            source_bank: tx.source_bank,
            raw_data: tx.raw_data,
            category,
            subcategory,
            is_transfer,
            is_reversal,
            is_ignored,
            signature,
            confidence,
            budget_group,
            month_year,
        }
    }

    fn is_transfer(&self, haystack: &str, tx: &NormalizedTransaction) -> bool {
        if contains_any(haystack, TRANSFER_PATTERNS) {
            return true;
        }
        if self.account_number.is_match(haystack) {
            return true;
        }
        // A round four-figure "payment" is far more likely an inter-account
        // move than a purchase
        let round = tx.amount.fract() == 0.0;
        round && tx.amount > ROUND_TRANSFER_MINIMUM && contains_any(haystack, WEAK_TRANSFER_PATTERNS)
    }

    /// Match charge-and-refund cycles across the batch.
    ///
    /// For each transaction, later transactions within the day window are
    /// candidates when magnitudes agree within a cent, directions oppose, and
    /// descriptions are similar enough. Both sides of a match are marked
    /// `is_reversal` and `is_ignored`; the pairs are returned for audit.
    pub fn pair_reversals(
        &self,
        transactions: &mut [ClassifiedTransaction],
    ) -> Vec<ReversalPair> {
        let mut order: Vec<usize> = (0..transactions.len()).collect();
        order.sort_by_key(|&i| transactions[i].date);

        let mut paired = vec![false; transactions.len()];
        let mut pairs = Vec::new();

        for (pos, &i) in order.iter().enumerate() {
            if paired[i] || transactions[i].is_transfer {
                continue;
            }
            for &j in &order[pos + 1..] {
                if paired[j] || transactions[j].is_transfer {
                    continue;
                }
                let gap = transactions[j].date - transactions[i].date;
                if gap > Duration::days(REVERSAL_WINDOW_DAYS) {
                    break;
                }
                if (transactions[i].amount - transactions[j].amount).abs()
                    > REVERSAL_AMOUNT_TOLERANCE
                {
                    continue;
                }
                if transactions[i].is_income == transactions[j].is_income {
                    continue;
                }
                let similarity = normalized_similarity(
                    &strip_reversal_markers(&transactions[i].description),
                    &strip_reversal_markers(&transactions[j].description),
                );
                if similarity < REVERSAL_SIMILARITY_THRESHOLD {
                    continue;
                }

                debug!(
                    first = %transactions[i].description,
                    second = %transactions[j].description,
                    similarity,
                    "Reversal pair matched"
                );
                for index in [i, j] {
                    transactions[index].is_reversal = true;
                    transactions[index].is_ignored = true;
                    transactions[index].category = Category::Reversal;
                }
                paired[i] = true;
                paired[j] = true;
                pairs.push((i, j));
                break;
            }
        }

        pairs
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Drop self-identifying reversal words so "Online Purchase Refund" compares
/// against "Online Purchase" as the same underlying transaction.
fn strip_reversal_markers(description: &str) -> String {
    let mut result = description.to_lowercase();
    for pattern in REVERSAL_PATTERNS {
        result = result.replace(pattern, "");
    }
    result
}
