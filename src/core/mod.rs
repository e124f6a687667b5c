//! blog-search core module
//!
//! Configuration, error types and the plain data records shared by the
//! search core and its collaborators.

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use config::{AppConfig, DictionaryConfig, SearchConfig};
pub use error::{BlogSearchError, Result};
