//! Core data types for blog-search
//!
//! This module defines the records exchanged between the search core and
//! the rest of the blog backend.

pub mod document;
pub mod search;

// Re-export commonly used types
pub use document::{Document, NewDocument};
pub use search::{SearchPage, SearchResultItem};
