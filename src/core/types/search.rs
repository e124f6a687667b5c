//! Search types
//!
//! Plain data produced by the search core for the transport layer to
//! serialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ranked hit with its excerpt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    /// Document identifier
    pub id: u64,

    /// Article title
    pub title: String,

    /// Cover image URL
    pub img_url: String,

    /// Time the author last adjusted the article
    pub adjusted_at: DateTime<Utc>,

    /// Engine relevance score, higher is more relevant
    pub score: f64,

    /// Keyword-centered or truncated summary of the body
    pub excerpt: String,
}

/// A page of search results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total number of matching documents across all pages
    pub total: u64,

    /// Hits on the requested page, score descending
    pub list: Vec<SearchResultItem>,
}

impl SearchPage {
    /// The page returned for queries that match nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}
