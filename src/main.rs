//! blog-search command line entry point
//!
//! Usage: `blog-search [CONFIG] [QUERY...]`
//!
//! Opens the article database, brings every article's index value up to
//! date and, when a query is given, prints the first result page as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use blog_search::logging::LoggingSystem;
use blog_search::{
    open_database, AppConfig, BlogSearchError, SearchPage, SearchService, Segmenter,
    SqliteDocumentStore,
};

/// Environment variable naming the configuration file
const CONFIG_ENV: &str = "BLOG_SEARCH_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let config_path = args
        .next()
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(AppConfig::default_path);
    let query = args.collect::<Vec<_>>().join(" ");

    let config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    let logging = LoggingSystem::init(config.logging.clone())
        .context("Failed to initialize logging")?;

    tracing::info!("Starting blog-search v{}", env!("CARGO_PKG_VERSION"));
    if let Some(dir) = logging.log_directory() {
        tracing::info!("Writing logs to {:?}", dir);
    }

    match run(&config, &query).await {
        Ok(Some(page)) => {
            println!("{}", serde_json::to_string_pretty(&page)?);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(e) => {
            if e.is_fatal() {
                tracing::error!("blog-search cannot start: {}", e);
            } else {
                tracing::error!("blog-search failed: {}", e);
            }
            Err(e.into())
        }
    }
}

/// Reindex every article, then run `query` if one was given
async fn run(config: &AppConfig, query: &str) -> Result<Option<SearchPage>, BlogSearchError> {
    let pool = open_database(&config.database).await?;
    let store = Arc::new(SqliteDocumentStore::new(pool, config.search.rank_weights()));
    let segmenter = Arc::new(Segmenter::load(&config.dictionary)?);
    let service = SearchService::new(segmenter, store, config.search.clone());

    let report = service.reindex_all().await?;
    if !report.failed.is_empty() {
        tracing::warn!(
            "{} articles could not be indexed: {:?}",
            report.failed.len(),
            report.failed
        );
    }

    if query.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(service.search_first_page(query).await?))
}
