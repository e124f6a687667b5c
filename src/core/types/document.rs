//! Document types
//!
//! A document is an article owned by the store. The search core only reads
//! it and writes its index value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Article record as seen by the search core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Store-assigned identifier
    pub id: u64,

    /// Article title
    pub title: String,

    /// Article body (markdown source)
    pub body: String,

    /// Cover image URL
    #[serde(default)]
    pub img_url: String,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last update time
    pub updated_at: DateTime<Utc>,

    /// Time the author last adjusted the article
    pub adjusted_at: DateTime<Utc>,

    /// Soft-delete marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Whether the document has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Fields supplied when creating or replacing a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub img_url: String,
}

impl NewDocument {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            img_url: String::new(),
        }
    }

    /// Set the cover image URL
    pub fn with_img_url(mut self, img_url: impl Into<String>) -> Self {
        self.img_url = img_url.into();
        self
    }
}
