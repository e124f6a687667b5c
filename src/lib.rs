//! blog-search - text search and summarization core of a blog backend
//!
//! This crate provides:
//! - Chinese/mixed-script word segmentation backed by a jieba dictionary
//! - Per-article weighted index values (title over body)
//! - Injection-safe conjunctive query planning
//! - Relevance-ranked, paginated retrieval over SQLite FTS5
//! - Keyword-centered excerpts for result listings

pub mod core;
pub mod db;
pub mod logging;
pub mod search;
pub mod store;

// Re-export commonly used items
pub use crate::core::config::{AppConfig, DictionaryConfig, SearchConfig};
pub use crate::core::error::{BlogSearchError, Result};
pub use crate::core::types::{Document, NewDocument, SearchPage, SearchResultItem};
pub use db::{create_database_pool, open_database, DatabaseConfig};
pub use search::{SearchService, Segmenter};
pub use store::{DocumentStore, SqliteDocumentStore};
