//! Database module for blog-search
//!
//! This module provides SQLite connectivity with WAL mode support so that
//! searches keep reading while index values are rewritten.

pub mod migration;


use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use crate::core::error::{BlogSearchError, Result};

/// SQLite synchronous mode configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynchronousMode {
    /// Fastest, but may lose data on crash
    Off,
    /// Balanced performance and safety
    #[default]
    Normal,
    /// Safest, but slowest
    Full,
}

/// SQLite connection pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database file path
    pub db_path: PathBuf,

    /// Maximum number of connections
    pub max_connections: u32,

    /// Minimum number of connections
    pub min_connections: u32,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    pub idle_timeout_secs: u64,

    /// Whether to enable WAL mode
    pub enable_wal: bool,

    /// Synchronous mode
    pub synchronous: SynchronousMode,

    /// Busy timeout in milliseconds
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_path: dirs::data_local_dir()
                .map(|dir| dir.join("blog-search").join("blog.db"))
                .unwrap_or_else(|| PathBuf::from("blog.db")),
            max_connections: 10,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
            enable_wal: true,
            synchronous: SynchronousMode::Normal,
            busy_timeout_ms: 5000,
        }
    }
}

impl DatabaseConfig {
    /// Create a new DatabaseConfig with the specified path
    pub fn with_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            ..Default::default()
        }
    }

    /// Set WAL mode
    pub fn with_wal(mut self, enable: bool) -> Self {
        self.enable_wal = enable;
        self
    }
}

/// Create a database connection pool with the given configuration
///
/// Concurrent writers to the same article row queue on SQLite's write lock
/// for up to `busy_timeout_ms`; readers are not blocked in WAL mode.
///
/// # Errors
///
/// Returns an error if the database cannot be created or connected to
pub async fn create_database_pool(config: &DatabaseConfig) -> Result<SqlitePool> {
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let connect_options = SqliteConnectOptions::new()
        .filename(&config.db_path)
        .create_if_missing(true)
        .journal_mode(if config.enable_wal {
            SqliteJournalMode::Wal
        } else {
            SqliteJournalMode::Delete
        })
        .synchronous(match config.synchronous {
            SynchronousMode::Off => SqliteSynchronous::Off,
            SynchronousMode::Normal => SqliteSynchronous::Normal,
            SynchronousMode::Full => SqliteSynchronous::Full,
        })
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms as u64))
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(connect_options)
        .await
        .map_err(BlogSearchError::Database)?;

    tracing::info!(
        "Database pool created: {:?} (WAL: {}, connections: {})",
        config.db_path,
        config.enable_wal,
        config.max_connections
    );

    Ok(pool)
}

/// Open the pool and bring the schema up to date
pub async fn open_database(config: &DatabaseConfig) -> Result<SqlitePool> {
    let pool = create_database_pool(config).await?;
    let result = migration::MigrationManager::new(pool.clone())
        .with_embedded_migrations()
        .migrate()
        .await?;
    tracing::info!(
        applied = result.applied,
        skipped = result.skipped,
        version = result.current_version,
        "Database schema ready"
    );
    Ok(pool)
}
