//! SQLite implementation of the document store
//!
//! Articles live in the `articles` table. Their index values live in the
//! FTS5 table `article_tokens`, keyed by the article id as rowid, with one
//! column per weight class:
//!
//! - `title_tokens` is weight class A
//! - `body_tokens` is weight class B
//!
//! Ranking uses FTS5's `bm25()` with per-column weights, negated so that a
//! higher score means a better match.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use super::{DocumentStore, StoreError, StoreResult};
use crate::core::types::{Document, NewDocument};
use crate::search::index::WeightedTokenVector;
use crate::search::query::MatchExpression;

const DOCUMENT_COLUMNS: &str = "a.id AS id, a.title AS title, a.content AS content, \
    a.img_url AS img_url, a.adjusted_at AS adjusted_at, a.created_at AS created_at, \
    a.updated_at AS updated_at, a.deleted_at AS deleted_at";

/// Per-column bm25 weights of the two weight classes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankWeights {
    pub title: f64,
    pub body: f64,
}

impl Default for RankWeights {
    fn default() -> Self {
        Self {
            title: 1.0,
            body: 0.4,
        }
    }
}

/// Document store backed by a SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
    weights: RankWeights,
}

impl SqliteDocumentStore {
    /// Wrap a pool whose schema is already migrated
    pub fn new(pool: SqlitePool, weights: RankWeights) -> Self {
        Self { pool, weights }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn weights(&self) -> RankWeights {
        self.weights
    }

    /// Insert a new article; its index value is written separately
    pub async fn insert_document(&self, new: &NewDocument) -> StoreResult<Document> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, content, img_url, adjusted_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.img_url)
        .bind(now)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid() as u64;
        tracing::debug!(id, "Inserted article");

        Ok(Document {
            id,
            title: new.title.clone(),
            body: new.body.clone(),
            img_url: new.img_url.clone(),
            created_at: now,
            updated_at: now,
            adjusted_at: now,
            deleted_at: None,
        })
    }

    /// Replace the fields of a live article
    pub async fn update_document(&self, id: u64, new: &NewDocument) -> StoreResult<Document> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title = ?, content = ?, img_url = ?, adjusted_at = ?, updated_at = ?
            WHERE id = ? AND deleted_at IS NULL
            "#,
        )
        .bind(&new.title)
        .bind(&new.body)
        .bind(&new.img_url)
        .bind(now)
        .bind(now)
        .bind(sql_id(id))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }

        self.get_document(id)
            .await?
            .ok_or(StoreError::NotFound { id })
    }

    /// Mark an article deleted and drop its index value
    pub async fn soft_delete_document(&self, id: u64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("UPDATE articles SET deleted_at = ? WHERE id = ? AND deleted_at IS NULL")
            .bind(Utc::now())
            .bind(sql_id(id))
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }

        sqlx::query("DELETE FROM article_tokens WHERE rowid = ?")
            .bind(sql_id(id))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(id, "Soft-deleted article");
        Ok(())
    }

    /// Stored index value of a document, if any
    pub async fn index_value(&self, id: u64) -> StoreResult<Option<WeightedTokenVector>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT title_tokens, body_tokens FROM article_tokens WHERE rowid = ?")
                .bind(sql_id(id))
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(title, body)| WeightedTokenVector { title, body }))
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get_document(&self, id: u64) -> StoreResult<Option<Document>> {
        let sql = format!(
            "SELECT {} FROM articles a WHERE a.id = ? AND a.deleted_at IS NULL",
            DOCUMENT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(sql_id(id))
            .fetch_optional(&self.pool)
            .await?;
        row.map(|row| document_from_row(&row)).transpose().map_err(Into::into)
    }

    async fn update_index_field(&self, id: u64, vector: &WeightedTokenVector) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        // Write before any read: a deferred read transaction cannot upgrade
        // once another connection commits and fails with SQLITE_BUSY.
        sqlx::query("DELETE FROM article_tokens WHERE rowid = ?")
            .bind(sql_id(id))
            .execute(&mut *tx)
            .await?;

        let live: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM articles WHERE id = ? AND deleted_at IS NULL")
                .bind(sql_id(id))
                .fetch_optional(&mut *tx)
                .await?;
        if live.is_none() {
            return Err(StoreError::NotFound { id });
        }

        sqlx::query("INSERT INTO article_tokens (rowid, title_tokens, body_tokens) VALUES (?, ?, ?)")
            .bind(sql_id(id))
            .bind(&vector.title)
            .bind(&vector.body)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_documents(&self, after_id: u64, limit: u32) -> StoreResult<Vec<Document>> {
        let sql = format!(
            "SELECT {} FROM articles a WHERE a.id > ? AND a.deleted_at IS NULL ORDER BY a.id ASC LIMIT ?",
            DOCUMENT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(sql_id(after_id))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        rows.iter()
            .map(document_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    async fn count_matching(&self, expression: &MatchExpression) -> StoreResult<u64> {
        if expression.is_empty() {
            return Err(StoreError::EmptyExpression);
        }
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM article_tokens
            JOIN articles a ON a.id = article_tokens.rowid
            WHERE article_tokens MATCH ? AND a.deleted_at IS NULL
            "#,
        )
        .bind(expression.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count.max(0) as u64)
    }

    async fn query_ranked(
        &self,
        expression: &MatchExpression,
        limit: u32,
        offset: u64,
    ) -> StoreResult<Vec<(Document, f64)>> {
        if expression.is_empty() {
            return Err(StoreError::EmptyExpression);
        }
        // Weights are numbers from our own config, never user input.
        let sql = format!(
            r#"
            SELECT {columns}, -bm25(article_tokens, {title:?}, {body:?}) AS score
            FROM article_tokens
            JOIN articles a ON a.id = article_tokens.rowid
            WHERE article_tokens MATCH ? AND a.deleted_at IS NULL
            ORDER BY score DESC, a.id ASC
            LIMIT ? OFFSET ?
            "#,
            columns = DOCUMENT_COLUMNS,
            title = self.weights.title,
            body = self.weights.body,
        );
        let rows = sqlx::query(&sql)
            .bind(expression.as_str())
            .bind(limit as i64)
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let mut hits = Vec::with_capacity(rows.len());
        for row in &rows {
            let score: f64 = row.try_get("score")?;
            hits.push((document_from_row(row)?, score));
        }
        Ok(hits)
    }
}

/// SQLite rowids are signed; ids beyond `i64::MAX` cannot exist
fn sql_id(id: u64) -> i64 {
    i64::try_from(id).unwrap_or(i64::MAX)
}

fn document_from_row(row: &SqliteRow) -> Result<Document, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let deleted_at: Option<DateTime<Utc>> = row.try_get("deleted_at")?;
    Ok(Document {
        id: id as u64,
        title: row.try_get("title")?,
        body: row.try_get("content")?,
        img_url: row.try_get("img_url")?,
        adjusted_at: row.try_get("adjusted_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        deleted_at,
    })
}
