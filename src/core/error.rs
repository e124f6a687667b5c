//! Error types for blog-search
//!
//! Module-level errors live next to their modules; this file ties them
//! together for the composition root.

use thiserror::Error;

pub use crate::search::error::{IndexError, SearchError, SegmenterError};
pub use crate::store::StoreError;

/// Result type alias for blog-search operations
pub type Result<T> = std::result::Result<T, BlogSearchError>;

/// Main error type for blog-search
#[derive(Error, Debug)]
pub enum BlogSearchError {
    #[error("Segmenter error: {0}")]
    Segmenter(#[from] SegmenterError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database internal error: {0}")]
    DatabaseInternal(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database errors
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Migration failed: {reason}")]
    MigrationFailed { reason: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl BlogSearchError {
    /// Whether the failure leaves the service unable to start
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BlogSearchError::Segmenter(_)
                | BlogSearchError::Config(_)
                | BlogSearchError::DatabaseInternal(DatabaseError::MigrationFailed { .. })
        )
    }
}
