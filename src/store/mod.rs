//! Document persistence for the search core
//!
//! The core never talks to the database directly. It goes through
//! [`DocumentStore`], which owns the articles and their index values and
//! runs ranked queries on the full-text engine.

pub mod sqlite;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::types::Document;
use crate::search::index::WeightedTokenVector;
use crate::search::query::MatchExpression;

pub use sqlite::{RankWeights, SqliteDocumentStore};

/// Store-level errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Document not found: {id}")]
    NotFound { id: u64 },

    #[error("Refusing to run an empty match expression")]
    EmptyExpression,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence interface consumed by the search core
///
/// Soft-deleted documents are invisible through every method.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one live document
    async fn get_document(&self, id: u64) -> StoreResult<Option<Document>>;

    /// Overwrite the stored index value of a live document
    async fn update_index_field(&self, id: u64, vector: &WeightedTokenVector) -> StoreResult<()>;

    /// Live documents with `id > after_id`, ascending by id
    async fn list_documents(&self, after_id: u64, limit: u32) -> StoreResult<Vec<Document>>;

    /// Number of live documents matching the expression
    async fn count_matching(&self, expression: &MatchExpression) -> StoreResult<u64>;

    /// One page of matches ordered by score descending
    async fn query_ranked(
        &self,
        expression: &MatchExpression,
        limit: u32,
        offset: u64,
    ) -> StoreResult<Vec<(Document, f64)>>;
}
