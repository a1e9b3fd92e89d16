//! Integration tests for kea-core
//!
//! These tests exercise the full load → parse → classify → dedup →
//! aggregate → recommend workflow.

use std::collections::HashSet;
use std::sync::Arc;

use kea_core::{
    aggregate, deduplicate, recommend, signature,
    models::{Category, Confidence},
    source::rows_from_reader,
    BankRegistry, MemoryStore, Pipeline, TransactionClassifier, UnifiedParser,
};

/// One month of ASB-style data: salary, rent, groceries, a transfer, and a
/// charge-and-refund pair.
fn asb_csv() -> &'static str {
    "\
Date,Particulars,Reference,Amount
01/05/2024,ACME LTD Salary,PAY-119,4800.00
02/05/2024,Landlord rent,AP-2,-1800.00
04/05/2024,Countdown Mt Eden,,-180.50
11/05/2024,Countdown Mt Eden,,-160.20
06/05/2024,Transfer to savings 12-3141-0012345-000,,-500.00
08/05/2024,Mighty Ape Order 8812,,-129.00
10/05/2024,Mighty Ape Order 8812 Refund,,129.00
15/05/2024,Z Energy Penrose,,-88.40
"
}

fn load(filename: &str, data: &str) -> (Vec<String>, Vec<kea_core::RawRow>) {
    rows_from_reader(filename, data.as_bytes()).expect("CSV loads")
}

#[test]
fn test_full_parse_classify_aggregate_workflow() {
    let registry = BankRegistry::default();
    let parser = UnifiedParser::new(&registry);

    let (headers, rows) = load("asb-may.csv", asb_csv());
    let result = parser.parse("asb-may.csv", &headers, &rows);

    assert_eq!(result.detected_bank, "ASB");
    assert_eq!(result.confidence, Confidence::High);
    assert_eq!(result.transactions.len(), 8);
    for tx in &result.transactions {
        assert!(tx.amount >= 0.0, "amounts are magnitudes");
    }

    let classified = TransactionClassifier::new().classify(result.transactions);

    // Transfer excluded, refund pair excluded on both sides
    let ignored: Vec<&str> = classified
        .iter()
        .filter(|t| t.is_ignored)
        .map(|t| t.description.as_str())
        .collect();
    assert_eq!(ignored.len(), 3, "ignored set was {:?}", ignored);

    let budget = aggregate(&classified, "2024-05");
    assert_eq!(budget.total_income, 4800.00);
    let expected_expenses = 1800.00 + 180.50 + 160.20 + 88.40;
    assert!((budget.total_expenses - expected_expenses).abs() < 1e-9);
    assert!(budget.savings_rate > 0.0);

    // Housing should lead the expense categories
    assert_eq!(budget.insights.top_expense_categories[0].0, "housing");
}

#[test]
fn test_duplicate_round_trip_yields_zero() {
    let registry = BankRegistry::default();
    let parser = UnifiedParser::new(&registry);

    let (headers, rows) = load("asb-may.csv", asb_csv());
    let first = parser.parse("asb-may.csv", &headers, &rows);
    let prior: HashSet<String> = first.transactions.iter().map(signature).collect();

    let second = parser.parse("asb-may.csv", &headers, &rows);
    let outcome = deduplicate(second.transactions, &prior);

    assert!(outcome.unique.is_empty());
    assert_eq!(outcome.duplicates_skipped, 8);
}

#[test]
fn test_classification_exclusivity() {
    let registry = BankRegistry::default();
    let parser = UnifiedParser::new(&registry);

    let (headers, rows) = load("asb-may.csv", asb_csv());
    let result = parser.parse("asb-may.csv", &headers, &rows);
    let classified = TransactionClassifier::new().classify(result.transactions);

    for tx in &classified {
        assert!(
            !(tx.is_transfer && tx.is_income),
            "{} is both transfer and income",
            tx.description
        );
        assert_eq!(tx.is_ignored, tx.is_transfer || tx.is_reversal);
    }
}

#[test]
fn test_unknown_format_still_parses() {
    let registry = BankRegistry::default();
    let parser = UnifiedParser::new(&registry);

    let csv = "\
Transaction Date,Merchant,Transaction Amount
2024-12-01,Gas Station,-65.00
";
    let (headers, rows) = load("mystery.csv", csv);
    let result = parser.parse("mystery.csv", &headers, &rows);

    assert!(matches!(
        result.confidence,
        Confidence::Low | Confidence::Medium
    ));
    assert_eq!(result.transactions.len(), 1);
    assert_eq!(result.transactions[0].amount, 65.00);
    assert!(!result.transactions[0].is_income);
}

#[tokio::test]
async fn test_pipeline_import_then_recommend() {
    let store = Arc::new(MemoryStore::new());
    let pipeline = Pipeline::new(BankRegistry::default(), store.clone());

    let (headers, rows) = load("asb-may.csv", asb_csv());
    let summary = pipeline.import("asb-may.csv", &headers, &rows).await.unwrap();

    assert_eq!(summary.detected_bank, "ASB");
    assert_eq!(summary.parsed, 8);
    assert_eq!(summary.accepted, 8);
    assert_eq!(summary.reversal_pairs, 1);

    // Importing the same statement again accepts nothing
    let again = pipeline.import("asb-may.csv", &headers, &rows).await.unwrap();
    assert_eq!(again.accepted, 0);
    assert_eq!(again.duplicates_skipped, 8);

    let budget = aggregate(&store.all(), "2024-05");
    let goals = recommend(&[budget]);

    assert!(!goals.is_empty());
    assert!(goals.len() <= 3);
    assert_eq!(goals[0].category, "emergency_fund");
}

#[test]
fn test_negative_cash_flow_yields_single_advisory() {
    let registry = BankRegistry::default();
    let parser = UnifiedParser::new(&registry);

    let csv = "\
Date,Particulars,Amount
01/05/2024,ACME LTD Salary,1000.00
02/05/2024,Landlord rent,-1400.00
";
    let (headers, rows) = load("asb.csv", csv);
    let result = parser.parse("asb.csv", &headers, &rows);
    let classified = TransactionClassifier::new().classify(result.transactions);

    let budget = aggregate(&classified, "2024-05");
    assert!(budget.savings < 0.0);

    let goals = recommend(&[budget]);
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].category, "cash_flow");
}

#[test]
fn test_kiwibank_debit_credit_statement() {
    let registry = BankRegistry::default();
    let parser = UnifiedParser::new(&registry);

    let csv = "\
Date,Memo/Description,OP name,Amount (debit),Amount (credit),Balance
03/05/2024,Pak'nSave Royal Oak,,142.80,,1200.00
05/05/2024,IRD Working for Families,IRD,,120.00,1320.00
";
    let (headers, rows) = load("kiwibank-may.csv", csv);
    let result = parser.parse("kiwibank-may.csv", &headers, &rows);

    assert_eq!(result.detected_bank, "Kiwibank");
    assert_eq!(result.transactions.len(), 2);
    assert!(!result.transactions[0].is_income);
    assert!(result.transactions[1].is_income);

    let classified = TransactionClassifier::new().classify(result.transactions);
    assert_eq!(classified[0].category, Category::Groceries);
    assert_eq!(classified[1].category, Category::Income);
    assert_eq!(classified[1].subcategory.as_deref(), Some("government"));
}
