//! Error types for Kea
//!
//! Row-level problems inside a statement are not errors: they become batch
//! warnings so one bad row never discards the other 499. These variants
//! cover failures of the surrounding machinery only.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Categorizer error: {0}")]
    Categorizer(String),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, Error>;
