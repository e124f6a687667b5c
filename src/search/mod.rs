//! Full-text search core for blog-search
//!
//! This module provides:
//! - Dictionary-driven Chinese/mixed-script segmentation (jieba)
//! - Weighted per-article index values (title class A, body class B)
//! - Injection-safe conjunctive query planning
//! - Ranked, paginated retrieval through the document store
//! - Keyword-centered, multi-byte-safe excerpts

pub mod error;
pub mod excerpt;
pub mod index;
pub mod query;
pub mod ranker;
pub mod service;
pub mod tokenizer;


pub use error::{IndexError, SearchError, SegmenterError};
pub use excerpt::{pick_keyword, summarize, ELLIPSIS};
pub use index::{IndexBuilder, ReindexReport, WeightClass, WeightedTokenVector};
pub use query::{MatchExpression, QueryPlan, QueryPlanner};
pub use ranker::{RankedHit, RankedPage, Ranker};
pub use service::SearchService;
pub use tokenizer::{is_noise, Segmenter, MIN_TOKEN_CHARS};
