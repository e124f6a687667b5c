//! Search service
//!
//! Composes the planner, ranker and excerpt generator for read requests,
//! and the index builder for write-side hooks.

use std::sync::Arc;
use std::time::Duration;

use super::error::{IndexError, SearchError};
use super::excerpt::{pick_keyword, summarize};
use super::index::{IndexBuilder, ReindexReport, WeightedTokenVector};
use super::query::{QueryPlan, QueryPlanner};
use super::ranker::{RankedHit, Ranker};
use super::tokenizer::Segmenter;
use crate::core::config::SearchConfig;
use crate::core::types::{SearchPage, SearchResultItem};
use crate::store::DocumentStore;

/// Entry point of the search core
pub struct SearchService<S: DocumentStore> {
    planner: QueryPlanner,
    builder: IndexBuilder<S>,
    ranker: Ranker<S>,
    config: SearchConfig,
}

impl<S: DocumentStore> SearchService<S> {
    pub fn new(segmenter: Arc<Segmenter>, store: Arc<S>, config: SearchConfig) -> Self {
        let deadline = config.query_timeout_ms.map(Duration::from_millis);
        Self {
            planner: QueryPlanner::new(Arc::clone(&segmenter)),
            builder: IndexBuilder::new(segmenter, Arc::clone(&store)),
            ranker: Ranker::new(store).with_deadline(deadline),
            config,
        }
    }

    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }

    pub fn index_builder(&self) -> &IndexBuilder<S> {
        &self.builder
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run a ranked search and attach excerpts
    ///
    /// A query without usable tokens returns an empty page without touching
    /// the store.
    pub async fn search(
        &self,
        raw_query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<SearchPage, SearchError> {
        if page == 0 || page_size == 0 || page_size > self.config.max_page_size {
            return Err(SearchError::InvalidPage { page, page_size });
        }

        let plan = self.planner.plan(raw_query);
        if plan.is_empty() {
            tracing::debug!(query = raw_query, "Query has no searchable tokens");
            return Ok(SearchPage::empty());
        }

        let ranked = self.ranker.search(&plan.expression, page, page_size).await?;
        let list = ranked
            .hits
            .into_iter()
            .map(|hit| self.result_item(hit, raw_query, &plan))
            .collect();

        tracing::info!(
            query = raw_query,
            page,
            page_size,
            total = ranked.total,
            "Search completed"
        );
        Ok(SearchPage {
            total: ranked.total,
            list,
        })
    }

    /// Search with the configured default page size
    pub async fn search_first_page(&self, raw_query: &str) -> Result<SearchPage, SearchError> {
        self.search(raw_query, 1, self.config.default_page_size).await
    }

    fn result_item(&self, hit: RankedHit, raw_query: &str, plan: &QueryPlan) -> SearchResultItem {
        let RankedHit { document, score } = hit;
        let keyword = pick_keyword(&document.body, raw_query, &plan.tokens).unwrap_or("");
        let excerpt = summarize(
            &document.body,
            keyword,
            self.config.excerpt_max_len,
            self.config.excerpt_context_len,
        )
        .replace(['\r', '\n'], "");

        SearchResultItem {
            id: document.id,
            title: document.title,
            img_url: document.img_url,
            adjusted_at: document.adjusted_at,
            score,
            excerpt,
        }
    }

    /// Rebuild the index value of one document
    pub async fn index_document(&self, id: u64) -> Result<WeightedTokenVector, IndexError> {
        self.builder.index_document(id).await
    }

    /// Best-effort indexing after a successful document write
    ///
    /// Never fails the write: errors are logged and the document stays
    /// unindexed until the next batch reindex. Returns whether indexing
    /// succeeded.
    pub async fn after_document_write(&self, id: u64) -> bool {
        match self.builder.index_document(id).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    retryable = e.is_retryable(),
                    "Indexing document {} failed, left for batch reindex: {}",
                    id,
                    e
                );
                false
            }
        }
    }

    /// Reindex every document using the configured batch size
    pub async fn reindex_all(&self) -> Result<ReindexReport, IndexError> {
        self.reindex_from(0, self.config.reindex_batch_size).await
    }

    /// Resume a reindex after `after_id`
    pub async fn reindex_from(&self, after_id: u64, batch_size: u32) -> Result<ReindexReport, IndexError> {
        self.builder.reindex(after_id, batch_size).await
    }
}
