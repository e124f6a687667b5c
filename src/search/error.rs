//! Error types for the search core

use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while building the segmenter
#[derive(Error, Debug)]
pub enum SegmenterError {
    #[error("Failed to load dictionary {path}: {reason}")]
    DictionaryLoad { path: PathBuf, reason: String },
}

/// Errors that can occur while indexing a document
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Document not found: {id}")]
    DocumentNotFound { id: u64 },

    #[error("Index persistence failed: {0}")]
    Store(#[from] StoreError),

    #[error("Reindex interrupted after document {watermark}: {source}")]
    Interrupted {
        watermark: u64,
        #[source]
        source: StoreError,
    },
}

impl IndexError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            IndexError::DocumentNotFound { .. } => false,
            IndexError::Store(StoreError::NotFound { .. }) => false,
            IndexError::Store(_) | IndexError::Interrupted { .. } => true,
        }
    }
}

/// Errors surfaced to search callers
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Ranked retrieval failed: {0}")]
    Retrieval(#[from] StoreError),

    #[error("Search timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid page request: page={page}, page_size={page_size}")]
    InvalidPage { page: u32, page_size: u32 },
}
