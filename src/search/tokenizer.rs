//! Dictionary-driven word segmentation
//!
//! Wraps jieba-rs. The dictionary is loaded once when the service starts
//! and the resulting [`Segmenter`] is immutable, so it is shared between
//! requests through an `Arc` without locking.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use jieba_rs::Jieba;

use super::error::SegmenterError;
use crate::core::config::DictionaryConfig;

/// Shortest token, in characters, that survives the noise filter
pub const MIN_TOKEN_CHARS: usize = 2;

/// Word segmenter backed by a jieba dictionary
#[derive(Clone)]
pub struct Segmenter {
    jieba: Arc<Jieba>,
    hmm: bool,
}

impl Segmenter {
    /// Build a segmenter from configuration
    ///
    /// A configured dictionary that cannot be read is fatal: no tokenization
    /// is possible without it.
    pub fn load(config: &DictionaryConfig) -> Result<Self, SegmenterError> {
        let mut jieba = match config.path {
            Some(ref path) => {
                let mut reader = open_dictionary(path)?;
                let jieba = Jieba::with_dict(&mut reader).map_err(|e| {
                    SegmenterError::DictionaryLoad {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })?;
                tracing::info!("Segmenter dictionary loaded from {:?}", path);
                jieba
            }
            None => {
                tracing::info!("Segmenter using embedded dictionary");
                Jieba::new()
            }
        };

        for path in &config.user_dictionaries {
            let mut reader = open_dictionary(path)?;
            jieba
                .load_dict(&mut reader)
                .map_err(|e| SegmenterError::DictionaryLoad {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            tracing::info!("User dictionary merged from {:?}", path);
        }

        Ok(Self {
            jieba: Arc::new(jieba),
            hmm: config.hmm,
        })
    }

    /// Segmenter over the embedded jieba dictionary
    pub fn with_default_dictionary() -> Self {
        Self {
            jieba: Arc::new(Jieba::new()),
            hmm: false,
        }
    }

    /// Segmenter over a word list read from `reader`, one `word [freq] [tag]`
    /// entry per line
    pub fn from_reader<R: BufRead>(reader: &mut R, hmm: bool) -> Result<Self, SegmenterError> {
        let jieba = Jieba::with_dict(reader).map_err(|e| SegmenterError::DictionaryLoad {
            path: "<reader>".into(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            jieba: Arc::new(jieba),
            hmm,
        })
    }

    /// Split text into index tokens
    ///
    /// Uses search-mode cutting, which also emits the dictionary words
    /// nested inside long words. Tokens are lowercased; noise tokens are
    /// dropped (see [`is_noise`]).
    pub fn segment(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.jieba
            .cut_for_search(text, self.hmm)
            .into_iter()
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !is_noise(word))
            .collect()
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::with_default_dictionary()
    }
}

impl std::fmt::Debug for Segmenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Segmenter").field("hmm", &self.hmm).finish()
    }
}

/// Single characters, whitespace and pure punctuation carry no meaning for
/// ranking
pub fn is_noise(token: &str) -> bool {
    token.chars().count() < MIN_TOKEN_CHARS || !token.chars().any(char::is_alphanumeric)
}

fn open_dictionary(path: &Path) -> Result<BufReader<File>, SegmenterError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| SegmenterError::DictionaryLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}
