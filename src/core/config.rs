//! Configuration module for blog-search
//!
//! Handles application configuration including:
//! - Database location and pool tuning
//! - Segmentation dictionary
//! - Ranking weights, excerpt sizes and paging limits
//! - Logging

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use crate::db::DatabaseConfig;
use crate::logging::LoggingConfig;
use crate::store::RankWeights;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Segmentation dictionary
    #[serde(default)]
    pub dictionary: DictionaryConfig,

    /// Search and indexing settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Segmentation dictionary configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictionaryConfig {
    /// Main word list; the embedded jieba dictionary is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Extra word lists merged on top of the main dictionary
    #[serde(default)]
    pub user_dictionaries: Vec<PathBuf>,

    /// Recognize out-of-vocabulary words with the HMM model
    #[serde(default)]
    pub hmm: bool,
}

/// Search and indexing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Ranking weight of title tokens (weight class A)
    #[serde(default = "default_title_weight")]
    pub title_weight: f64,

    /// Ranking weight of body tokens (weight class B)
    #[serde(default = "default_body_weight")]
    pub body_weight: f64,

    /// Excerpt length when no keyword is found
    #[serde(default = "default_excerpt_max_len")]
    pub excerpt_max_len: usize,

    /// Characters kept on each side of a found keyword
    #[serde(default = "default_excerpt_context_len")]
    pub excerpt_context_len: usize,

    /// Page size used when the caller does not pick one
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest page size a caller may request
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Deadline for each engine call, no deadline when unset
    #[serde(default)]
    pub query_timeout_ms: Option<u64>,

    /// Documents fetched per round of a batch reindex
    #[serde(default = "default_reindex_batch_size")]
    pub reindex_batch_size: u32,
}

fn default_title_weight() -> f64 {
    1.0
}

fn default_body_weight() -> f64 {
    0.4
}

fn default_excerpt_max_len() -> usize {
    200
}

fn default_excerpt_context_len() -> usize {
    50
}

fn default_page_size() -> u32 {
    10
}

fn default_max_page_size() -> u32 {
    100
}

fn default_reindex_batch_size() -> u32 {
    100
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            title_weight: default_title_weight(),
            body_weight: default_body_weight(),
            excerpt_max_len: default_excerpt_max_len(),
            excerpt_context_len: default_excerpt_context_len(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            query_timeout_ms: None,
            reindex_batch_size: default_reindex_batch_size(),
        }
    }
}

impl SearchConfig {
    /// Check the values the engine and pager rely on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.title_weight > 0.0 && self.body_weight > 0.0) {
            return Err(ConfigError::Invalid(
                "ranking weights must be positive".to_string(),
            ));
        }
        if self.max_page_size == 0 || self.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "page sizes must be at least 1".to_string(),
            ));
        }
        if self.default_page_size > self.max_page_size {
            return Err(ConfigError::Invalid(format!(
                "default_page_size {} exceeds max_page_size {}",
                self.default_page_size, self.max_page_size
            )));
        }
        if self.reindex_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "reindex_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-column bm25 weights for the document store
    pub fn rank_weights(&self) -> RankWeights {
        RankWeights {
            title: self.title_weight,
            body: self.body_weight,
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file, falling back to defaults when
    /// the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str::<AppConfig>(&content)?
        } else {
            tracing::info!("No configuration at {:?}, using defaults", path);
            AppConfig::default()
        };
        config.search.validate()?;
        Ok(config)
    }

    /// Default configuration file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("blog-search")
            .join("config.json")
    }
}
