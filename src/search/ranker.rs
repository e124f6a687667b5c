//! Ranked retrieval
//!
//! Issues the count and page queries to the engine behind the store. Scores
//! are passed through untouched; retries are the caller's business.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::error::SearchError;
use super::query::MatchExpression;
use crate::core::types::Document;
use crate::store::{DocumentStore, StoreResult};

/// One ranked match
#[derive(Debug, Clone, PartialEq)]
pub struct RankedHit {
    pub document: Document,
    pub score: f64,
}

/// One page of ranked matches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedPage {
    /// Matches across all pages
    pub total: u64,

    /// Matches on this page, score descending
    pub hits: Vec<RankedHit>,
}

/// Executes match expressions against the store's ranking engine
pub struct Ranker<S: DocumentStore> {
    store: Arc<S>,
    deadline: Option<Duration>,
}

impl<S: DocumentStore> Ranker<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            deadline: None,
        }
    }

    /// Bound every engine call by `deadline`
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Fetch page `page` (1-based) of `page_size` matches
    ///
    /// Page bounds are validated by the caller. An empty expression never
    /// reaches the engine and yields an empty page.
    pub async fn search(
        &self,
        expression: &MatchExpression,
        page: u32,
        page_size: u32,
    ) -> Result<RankedPage, SearchError> {
        if expression.is_empty() {
            return Ok(RankedPage::default());
        }

        let total = self
            .bounded(self.store.count_matching(expression))
            .await?;

        let offset = u64::from(page.saturating_sub(1)) * u64::from(page_size);
        if offset >= total {
            return Ok(RankedPage {
                total,
                hits: Vec::new(),
            });
        }

        let hits = self
            .bounded(self.store.query_ranked(expression, page_size, offset))
            .await?
            .into_iter()
            .map(|(document, score)| RankedHit { document, score })
            .collect();

        Ok(RankedPage { total, hits })
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, SearchError>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, call)
                .await
                .map_err(|_| SearchError::Timeout {
                    timeout_ms: deadline.as_millis() as u64,
                })?
                .map_err(SearchError::from),
            None => call.await.map_err(SearchError::from),
        }
    }
}
