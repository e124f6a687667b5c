//! Database migration manager for blog-search
//!
//! Provides automatic schema migration with atomic transactions.

use std::collections::HashMap;

use chrono::Utc;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::core::error::{BlogSearchError, DatabaseError, Result};

/// Represents a single database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Migration version number
    pub version: i64,
    /// Migration name
    pub name: String,
    /// SQL statements to apply the migration
    pub up_sql: String,
    /// Checksum for integrity verification
    pub checksum: String,
}

impl Migration {
    /// Create a new migration
    pub fn new(version: i64, name: impl Into<String>, up_sql: impl Into<String>) -> Self {
        let up_sql = up_sql.into();
        let checksum = Self::calculate_checksum(&up_sql);
        Self {
            version,
            name: name.into(),
            up_sql,
            checksum,
        }
    }

    /// Checksums are persisted, so they must not depend on the hasher of
    /// the running toolchain
    fn calculate_checksum(content: &str) -> String {
        hex::encode(Sha256::digest(content.as_bytes()))
    }

    /// Individual statements, skipping blanks and comment-only chunks
    fn statements(&self) -> impl Iterator<Item = &str> {
        self.up_sql
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty() && !s.starts_with("--"))
    }
}

/// Migration manager for handling database schema updates
pub struct MigrationManager {
    pool: SqlitePool,
    migrations: Vec<Migration>,
}

impl MigrationManager {
    /// Create a new migration manager
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            migrations: Vec::new(),
        }
    }

    /// Add a migration to the manager
    pub fn add_migration(&mut self, migration: Migration) {
        self.migrations.push(migration);
        self.migrations.sort_by_key(|m| m.version);
    }

    /// Load migrations from embedded SQL files
    pub fn with_embedded_migrations(mut self) -> Self {
        self.add_migration(Migration::new(
            1,
            "001_initial_schema",
            include_str!("../../migrations/001_initial_schema.sql"),
        ));
        self
    }

    /// Ensure the migrations table exists
    async fn ensure_migrations_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY NOT NULL,
                name TEXT NOT NULL,
                applied_at TEXT NOT NULL,
                checksum TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(BlogSearchError::Database)?;

        Ok(())
    }

    /// Get the current schema version
    pub async fn current_version(&self) -> Result<i64> {
        self.ensure_migrations_table().await?;

        let (version,): (Option<i64>,) = sqlx::query_as("SELECT MAX(version) FROM schema_migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(BlogSearchError::Database)?;

        Ok(version.unwrap_or(0))
    }

    /// Get list of applied migrations
    pub async fn applied_migrations(&self) -> Result<HashMap<i64, AppliedMigration>> {
        self.ensure_migrations_table().await?;

        let rows: Vec<(i64, String, String, String)> = sqlx::query_as(
            "SELECT version, name, applied_at, checksum FROM schema_migrations ORDER BY version",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(BlogSearchError::Database)?;

        Ok(rows
            .into_iter()
            .map(|(version, name, applied_at, checksum)| {
                (
                    version,
                    AppliedMigration {
                        version,
                        name,
                        applied_at,
                        checksum,
                    },
                )
            })
            .collect())
    }

    /// Run all pending migrations
    ///
    /// Applied migrations are verified against their checksum; pending ones
    /// run in version order, each inside its own transaction.
    pub async fn migrate(&self) -> Result<MigrationResult> {
        let applied = self.applied_migrations().await?;
        let mut result = MigrationResult::default();

        for migration in &self.migrations {
            if let Some(applied_migration) = applied.get(&migration.version) {
                if applied_migration.checksum != migration.checksum {
                    return Err(BlogSearchError::DatabaseInternal(
                        DatabaseError::MigrationFailed {
                            reason: format!(
                                "Migration {} checksum mismatch: expected {}, found {}",
                                migration.version, migration.checksum, applied_migration.checksum
                            ),
                        },
                    ));
                }
                result.skipped += 1;
                continue;
            }

            self.apply_migration(migration).await?;
            result.applied += 1;
            result.applied_versions.push(migration.version);
        }

        result.current_version = self.current_version().await?;
        Ok(result)
    }

    /// Apply a single migration atomically
    async fn apply_migration(&self, migration: &Migration) -> Result<()> {
        tracing::info!("Applying migration {}: {}", migration.version, migration.name);

        let mut tx = self.pool.begin().await.map_err(BlogSearchError::Database)?;

        for statement in migration.statements() {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    BlogSearchError::DatabaseInternal(DatabaseError::MigrationFailed {
                        reason: format!(
                            "Migration {} failed at statement: {}. Error: {}",
                            migration.version, statement, e
                        ),
                    })
                })?;
        }

        sqlx::query(
            r#"
            INSERT INTO schema_migrations (version, name, applied_at, checksum)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(migration.version)
        .bind(&migration.name)
        .bind(Utc::now().to_rfc3339())
        .bind(&migration.checksum)
        .execute(&mut *tx)
        .await
        .map_err(BlogSearchError::Database)?;

        tx.commit().await.map_err(BlogSearchError::Database)?;

        tracing::info!("Migration {} applied successfully", migration.version);

        Ok(())
    }
}

/// Information about an applied migration
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub version: i64,
    pub name: String,
    pub applied_at: String,
    pub checksum: String,
}

/// Result of running migrations
#[derive(Debug, Default)]
pub struct MigrationResult {
    /// Number of migrations applied
    pub applied: usize,
    /// Number of migrations skipped (already applied)
    pub skipped: usize,
    /// Versions that were applied
    pub applied_versions: Vec<i64>,
    /// Current schema version after migration
    pub current_version: i64,
}
