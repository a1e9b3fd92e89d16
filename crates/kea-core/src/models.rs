//! Data model for the Kea pipeline
//!
//! The pipeline moves strictly left to right:
//! `RawRow` -> `NormalizedTransaction` -> `ClassifiedTransaction` ->
//! `MonthlyBudget` -> `SmartGoal`. Each stage consumes only the previous
//! stage's output type.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum stored description length
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// A single statement row as handed over by the CSV tokenizer.
///
/// Ordered header -> cell pairs; discarded after extraction (the original
/// data survives as JSON on the normalized transaction).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRow {
    /// Name of the file this row came from
    pub source_file: String,
    /// Header/cell pairs in column order
    pub cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new(source_file: impl Into<String>, cells: Vec<(String, String)>) -> Self {
        Self {
            source_file: source_file.into(),
            cells,
        }
    }

    /// Look up a cell by exact header name
    pub fn get(&self, header: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    /// Cell value by column position
    pub fn value_at(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(|(_, v)| v.as_str())
    }

    /// All cell values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(_, v)| v.as_str())
    }

    /// Headers in column order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(h, _)| h.as_str())
    }

    /// Original row as a JSON object keyed by header
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (header, value) in &self.cells {
            map.insert(
                header.clone(),
                serde_json::Value::String(value.clone()),
            );
        }
        serde_json::Value::Object(map)
    }
}

/// Coarse label indicating which parsing strategy produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// A registered bank config matched and produced transactions
    High,
    /// The intelligent fallback worked after a config matched but failed
    Medium,
    /// Fallback parsing with no config corroboration
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Confidence::High),
            "medium" => Ok(Confidence::Medium),
            "low" => Ok(Confidence::Low),
            _ => Err(format!("Unknown confidence tier: {}", s)),
        }
    }
}

/// Known transaction categories
///
/// An explicit sum type rather than free-form strings so a typo can't
/// silently produce an unclassified bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Income,
    Housing,
    Utilities,
    Groceries,
    Dining,
    Transport,
    Healthcare,
    Subscriptions,
    Entertainment,
    Shopping,
    Transfer,
    Reversal,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Income => "income",
            Category::Housing => "housing",
            Category::Utilities => "utilities",
            Category::Groceries => "groceries",
            Category::Dining => "dining",
            Category::Transport => "transport",
            Category::Healthcare => "healthcare",
            Category::Subscriptions => "subscriptions",
            Category::Entertainment => "entertainment",
            Category::Shopping => "shopping",
            Category::Transfer => "transfer",
            Category::Reversal => "reversal",
            Category::Other => "other",
        }
    }

    /// Default 50/30/20 budget group for this category, used when a
    /// transaction carries no explicit group tag.
    pub fn default_budget_group(&self, is_income: bool) -> BudgetGroup {
        if is_income {
            return BudgetGroup::Savings;
        }
        match self {
            Category::Housing
            | Category::Utilities
            | Category::Groceries
            | Category::Healthcare
            | Category::Transport => BudgetGroup::Needs,
            Category::Income => BudgetGroup::Savings,
            _ => BudgetGroup::Wants,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Category::Income),
            "housing" => Ok(Category::Housing),
            "utilities" => Ok(Category::Utilities),
            "groceries" => Ok(Category::Groceries),
            "dining" => Ok(Category::Dining),
            "transport" => Ok(Category::Transport),
            "healthcare" => Ok(Category::Healthcare),
            "subscriptions" => Ok(Category::Subscriptions),
            "entertainment" => Ok(Category::Entertainment),
            "shopping" => Ok(Category::Shopping),
            "transfer" => Ok(Category::Transfer),
            "reversal" => Ok(Category::Reversal),
            "other" => Ok(Category::Other),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// 50/30/20-style budget grouping for an expense
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetGroup {
    Needs,
    Wants,
    Savings,
}

impl BudgetGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetGroup::Needs => "needs",
            BudgetGroup::Wants => "wants",
            BudgetGroup::Savings => "savings",
        }
    }
}

impl fmt::Display for BudgetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "needs" => Ok(BudgetGroup::Needs),
            "wants" => Ok(BudgetGroup::Wants),
            "savings" => Ok(BudgetGroup::Savings),
            _ => Err(format!("Unknown budget group: {}", s)),
        }
    }
}

/// A transaction normalized from a raw statement row.
///
/// `amount` is always a non-negative magnitude; direction is carried by
/// `is_income`, never by sign. Every downstream consumer relies on this.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub is_income: bool,
    pub merchant: Option<String>,
    pub source_bank: String,
    /// Original row retained for debugging
    pub raw_data: serde_json::Value,
}

impl NormalizedTransaction {
    /// Signed view of the amount (negative = expense)
    pub fn signed_amount(&self) -> f64 {
        if self.is_income {
            self.amount
        } else {
            -self.amount
        }
    }

    /// Month bucket key, e.g. "2024-05"
    pub fn month_year(&self) -> String {
        format!("{:04}-{:02}", self.date.year(), self.date.month())
    }
}

/// A transaction after heuristic classification.
///
/// Produced once per `NormalizedTransaction` and immutable thereafter; any
/// recategorization is a new pipeline run, not an in-place edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub is_income: bool,
    pub merchant: Option<String>,
    pub source_bank: String,
    pub raw_data: serde_json::Value,
    pub category: Category,
    pub subcategory: Option<String>,
    pub is_transfer: bool,
    pub is_reversal: bool,
    /// Excluded from income/expense totals but retained for audit
    pub is_ignored: bool,
    /// Dedup signature computed from the normalized transaction. Carried
    /// along because classification may flip `is_income` for transfers,
    /// which would change a recomputed signature.
    pub signature: String,
    pub confidence: f64,
    pub budget_group: BudgetGroup,
    /// Month bucket, e.g. "2024-05"
    pub month_year: String,
}

impl ClassifiedTransaction {
    pub fn signed_amount(&self) -> f64 {
        if self.is_income {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Result of parsing one uploaded file. Never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub transactions: Vec<NormalizedTransaction>,
    /// Matched bank config name, or "Unknown"
    pub detected_bank: String,
    pub confidence: Confidence,
    pub warnings: Vec<String>,
}

impl ParseResult {
    /// Empty low-confidence result carrying only warnings
    pub fn empty(warnings: Vec<String>) -> Self {
        Self {
            transactions: Vec::new(),
            detected_bank: "Unknown".to_string(),
            confidence: Confidence::Low,
            warnings,
        }
    }
}

/// A named bank statement format: identifying patterns plus column aliases.
///
/// Configs live in the registry and are matched against incoming files by
/// filename, then headers, then sample content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankConfig {
    pub name: String,
    /// Substrings matched against the lowercased filename
    #[serde(default)]
    pub filename_patterns: Vec<String>,
    /// Keywords matched against the joined lowercased header string
    #[serde(default)]
    pub header_patterns: Vec<String>,
    /// Keywords matched against the first data row's joined cells
    #[serde(default)]
    pub content_patterns: Vec<String>,
    pub date_aliases: Vec<String>,
    pub description_aliases: Vec<String>,
    #[serde(default)]
    pub amount_aliases: Vec<String>,
    #[serde(default)]
    pub debit_aliases: Vec<String>,
    #[serde(default)]
    pub credit_aliases: Vec<String>,
    #[serde(default)]
    pub balance_aliases: Vec<String>,
    #[serde(default)]
    pub reference_aliases: Vec<String>,
    #[serde(default)]
    pub merchant_aliases: Vec<String>,
}

/// Per-category statistics within a monthly budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub amount: f64,
    pub budget_group: BudgetGroup,
    pub transaction_count: usize,
    pub average_per_transaction: f64,
    pub is_income: bool,
}

/// Derived insight block on a monthly budget
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetInsights {
    /// Largest expense categories, highest first
    pub top_expense_categories: Vec<(String, f64)>,
    /// Expense totals per 50/30/20 group
    pub expenses_by_budget_group: BTreeMap<String, f64>,
    /// Percent change in expenses vs the previous month, when known
    pub month_over_month_change: Option<f64>,
}

/// Aggregated view of one month. Derived, recomputed per request,
/// regenerated wholesale from the transaction set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyBudget {
    pub month: String,
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings: f64,
    /// Percent of income saved; 0 when income is 0
    pub savings_rate: f64,
    pub categories: BTreeMap<String, CategoryStats>,
    pub insights: BudgetInsights,
}

/// How realistic a proposed goal is for this user's cash flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievability {
    Easy,
    Moderate,
    Challenging,
    Unrealistic,
}

impl Achievability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Achievability::Easy => "easy",
            Achievability::Moderate => "moderate",
            Achievability::Challenging => "challenging",
            Achievability::Unrealistic => "unrealistic",
        }
    }
}

impl fmt::Display for Achievability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A derived SMART-goal proposal. No identity until persisted elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartGoal {
    pub category: String,
    pub description: String,
    pub target_amount: f64,
    pub timeframe_months: u32,
    pub achievability: Achievability,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_row_lookup() {
        let row = RawRow::new(
            "asb.csv",
            vec![
                ("Date".to_string(), "15/05/2024".to_string()),
                ("Particulars".to_string(), "Uber Eats".to_string()),
                ("Amount".to_string(), "-22.40".to_string()),
            ],
        );

        assert_eq!(row.get("Particulars"), Some("Uber Eats"));
        assert_eq!(row.get("Memo"), None);
        assert_eq!(row.value_at(2), Some("-22.40"));

        let json = row.to_json();
        assert_eq!(json["Date"], "15/05/2024");
    }

    #[test]
    fn test_confidence_roundtrip() {
        assert_eq!(Confidence::High.as_str(), "high");
        assert_eq!(Confidence::from_str("medium").unwrap(), Confidence::Medium);
        assert!(Confidence::from_str("certain").is_err());
    }

    #[test]
    fn test_category_budget_group_defaults() {
        assert_eq!(
            Category::Groceries.default_budget_group(false),
            BudgetGroup::Needs
        );
        assert_eq!(
            Category::Entertainment.default_budget_group(false),
            BudgetGroup::Wants
        );
        assert_eq!(
            Category::Income.default_budget_group(true),
            BudgetGroup::Savings
        );
    }

    #[test]
    fn test_signed_amount_and_month_key() {
        let tx = NormalizedTransaction {
            date: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
            description: "Uber Eats".to_string(),
            amount: 22.40,
            is_income: false,
            merchant: None,
            source_bank: "ASB".to_string(),
            raw_data: serde_json::Value::Null,
        };

        assert_eq!(tx.signed_amount(), -22.40);
        assert_eq!(tx.month_year(), "2024-05");
    }
}
