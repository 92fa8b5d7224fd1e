//! Error types for plant growth

use thiserror::Error;

/// Main error type for the crate
///
/// Only configuration problems are errors. Rejected placements, quota limits
/// and blocked growth are ordinary growth outcomes and never surface here.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Catalog too large: {found} branch types reachable from the root (limit {limit})")]
    CatalogTooLarge { found: usize, limit: usize },

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
