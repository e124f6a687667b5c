//! Index building
//!
//! Converts a document's title and body into a [`WeightedTokenVector`] and
//! writes it to the store. Writes overwrite the previous value, so building
//! and persisting is idempotent and safe to retry.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::error::IndexError;
use super::tokenizer::Segmenter;
use crate::store::{DocumentStore, StoreError};

/// Ranking weight class of a token stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightClass {
    /// Title tokens
    A,
    /// Body tokens
    B,
}

/// Per-document index value: two whitespace-joined token streams
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedTokenVector {
    /// Weight class A stream
    pub title: String,

    /// Weight class B stream
    pub body: String,
}

impl WeightedTokenVector {
    pub fn from_tokens(title_tokens: &[String], body_tokens: &[String]) -> Self {
        Self {
            title: title_tokens.join(" "),
            body: body_tokens.join(" "),
        }
    }

    /// Token stream of one weight class
    pub fn stream(&self, class: WeightClass) -> &str {
        match class {
            WeightClass::A => &self.title,
            WeightClass::B => &self.body,
        }
    }

    /// Tokens of one weight class
    pub fn tokens(&self, class: WeightClass) -> impl Iterator<Item = &str> {
        self.stream(class).split_whitespace()
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.body.is_empty()
    }
}

/// Outcome of a batch reindex run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    /// Documents whose index value was rewritten
    pub indexed: usize,

    /// Documents whose index value could not be written
    pub failed: Vec<u64>,

    /// Highest id processed; resume from here
    pub watermark: u64,
}

/// Builds and persists index values
pub struct IndexBuilder<S: DocumentStore> {
    segmenter: Arc<Segmenter>,
    store: Arc<S>,
}

impl<S: DocumentStore> IndexBuilder<S> {
    pub fn new(segmenter: Arc<Segmenter>, store: Arc<S>) -> Self {
        Self { segmenter, store }
    }

    /// Tokenize title and body independently into their weight classes
    pub fn build_index(&self, title: &str, body: &str) -> WeightedTokenVector {
        let title_tokens = self.segmenter.segment(title);
        let body_tokens = self.segmenter.segment(body);
        WeightedTokenVector::from_tokens(&title_tokens, &body_tokens)
    }

    /// Overwrite the stored index value of a document
    pub async fn persist(&self, id: u64, vector: &WeightedTokenVector) -> Result<(), IndexError> {
        self.store
            .update_index_field(id, vector)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { id } => IndexError::DocumentNotFound { id },
                other => IndexError::Store(other),
            })
    }

    /// Fetch, tokenize and persist one document
    pub async fn index_document(&self, id: u64) -> Result<WeightedTokenVector, IndexError> {
        let document = self
            .store
            .get_document(id)
            .await?
            .ok_or(IndexError::DocumentNotFound { id })?;
        let vector = self.build_index(&document.title, &document.body);
        self.persist(id, &vector).await?;
        tracing::debug!(
            id,
            title_tokens = vector.tokens(WeightClass::A).count(),
            body_tokens = vector.tokens(WeightClass::B).count(),
            "Indexed document"
        );
        Ok(vector)
    }

    /// Rebuild index values of every document with `id > after_id`
    ///
    /// Runs sequentially in ascending id order, `batch_size` documents per
    /// round. A document that fails is logged and recorded in the report;
    /// a failure to list documents stops the run with the watermark reached
    /// so far.
    pub async fn reindex(&self, after_id: u64, batch_size: u32) -> Result<ReindexReport, IndexError> {
        let batch_size = batch_size.max(1);
        let mut report = ReindexReport {
            watermark: after_id,
            ..Default::default()
        };

        loop {
            let documents = self
                .store
                .list_documents(report.watermark, batch_size)
                .await
                .map_err(|source| IndexError::Interrupted {
                    watermark: report.watermark,
                    source,
                })?;

            if documents.is_empty() {
                break;
            }

            for document in &documents {
                let vector = self.build_index(&document.title, &document.body);
                match self.persist(document.id, &vector).await {
                    Ok(()) => report.indexed += 1,
                    Err(e) => {
                        tracing::warn!("Failed to update tokens for document {}: {}", document.id, e);
                        report.failed.push(document.id);
                    }
                }
                report.watermark = document.id;
            }
        }

        tracing::info!(
            indexed = report.indexed,
            failed = report.failed.len(),
            watermark = report.watermark,
            "Reindex finished"
        );
        Ok(report)
    }
}
