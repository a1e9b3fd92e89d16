//! Kea Core Library
//!
//! Shared functionality for the Kea budgeting tool:
//! - CSV statement loading and bank format detection for NZ banks
//! - Layered parsing (config-driven, header inference, positional fallback)
//! - Heuristic transaction classification with reversal-pair matching
//! - Signature-based duplicate detection
//! - Monthly budget aggregation and goal recommendation
//! - Pluggable persistence and categorizer seams

pub mod budget;
pub mod categorizer;
pub mod classify;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod goals;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod registry;
pub mod similarity;
pub mod source;
pub mod store;

pub use budget::aggregate;
pub use categorizer::{Categorizer, CategorySuggestion, MockCategorizer};
pub use classify::{ReversalPair, TransactionClassifier};
pub use dedup::{deduplicate, signature, DedupOutcome};
pub use error::{Error, Result};
pub use goals::{recommend, GoalContext, GoalRule, RecommendationEngine};
pub use models::{
    Achievability, BankConfig, BudgetGroup, BudgetInsights, Category, CategoryStats,
    ClassifiedTransaction, Confidence, MonthlyBudget, NormalizedTransaction, ParseResult, RawRow,
    SmartGoal,
};
pub use parse::UnifiedParser;
pub use pipeline::{ImportSummary, Pipeline};
pub use registry::{builtin_nz_configs, BankRegistry, Detection};
pub use store::{MemoryStore, TransactionStore};
