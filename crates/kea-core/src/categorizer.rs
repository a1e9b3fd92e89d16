//! Optional categorization fallback
//!
//! When heuristic classification lands in `Other` with low confidence, the
//! pipeline may consult an external categorizer (typically an LLM service).
//! The trait keeps that collaborator out of the core: the pipeline works
//! unchanged when no categorizer is wired in, and a failing categorizer
//! degrades to the heuristic result.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Category;

/// Confidence below which the pipeline consults the fallback categorizer
pub const BOOST_THRESHOLD: f64 = 0.6;

/// A category proposal from the external categorizer
#[derive(Debug, Clone)]
pub struct CategorySuggestion {
    pub category: Category,
    pub subcategory: Option<String>,
    pub confidence: f64,
}

#[async_trait]
pub trait Categorizer: Send + Sync {
    async fn categorize(&self, description: &str, amount: f64) -> Result<CategorySuggestion>;
}

/// Test categorizer returning a fixed suggestion
pub struct MockCategorizer {
    suggestion: CategorySuggestion,
}

impl MockCategorizer {
    pub fn new(category: Category, confidence: f64) -> Self {
        Self {
            suggestion: CategorySuggestion {
                category,
                subcategory: None,
                confidence,
            },
        }
    }
}

#[async_trait]
impl Categorizer for MockCategorizer {
    async fn categorize(&self, _description: &str, _amount: f64) -> Result<CategorySuggestion> {
        Ok(self.suggestion.clone())
    }
}

/// Test categorizer that always fails, for degradation tests
pub struct FailingCategorizer;

#[async_trait]
impl Categorizer for FailingCategorizer {
    async fn categorize(&self, _description: &str, _amount: f64) -> Result<CategorySuggestion> {
        Err(crate::error::Error::Categorizer(
            "categorizer unavailable".to_string(),
        ))
    }
}
