//! Database Connection Management
//!
//! Core connection and initialization for the relational store using
//! libsql/Turso.
//!
//! # Architecture
//!
//! - **Path-agnostic**: accepts any valid `PathBuf`, plus `:memory:` for tests
//! - **Idempotent schema**: `CREATE TABLE IF NOT EXISTS`, safe to re-run
//! - **WAL mode**: Write-Ahead Logging for better concurrency
//! - **Foreign keys**: enabled for referential integrity
//!
//! # Connection pattern
//!
//! Use `connect_with_timeout()` in async contexts. The busy timeout lets
//! concurrent operations wait and retry instead of failing immediately
//! with `SQLITE_BUSY` when the Tokio runtime interleaves writers.
//!
//! # Schema
//!
//! - `entities` - one row of descriptive attributes per node external id
//! - `graph_reconciliation` - durable log of pending graph-store cleanup
//!   obligations (see the lifecycle coordinator)

use crate::db::error::DatabaseError;
use libsql::Builder;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Database service managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use socialgraph_engine::db::Database;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db = Database::new(PathBuf::from("/path/to/socialgraph.db")).await?;
///     let conn = db.connect_with_timeout().await?;
///     # let _ = conn;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Database {
    /// libsql database handle (wrapped in Arc for sharing)
    db: Arc<libsql::Database>,

    /// Shared connection for `:memory:` databases
    ///
    /// A local `:memory:` database is private to the connection that
    /// opened it; a fresh `connect()` would see a new empty database.
    /// Handing out clones of one connection keeps the schema visible to
    /// every caller.
    shared_conn: Option<libsql::Connection>,

    /// Path to the database file (`:memory:` for the test constructor)
    db_path: PathBuf,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Open (or create) a database at the given path and initialize the schema
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the parent directory cannot be created,
    /// the connection fails, or schema initialization fails.
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        if let Some(parent) = db_path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let shared_conn = if db_path == Path::new(":memory:") {
            Some(
                db.connect()
                    .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?,
            )
        } else {
            None
        };

        let service = Self {
            db: Arc::new(db),
            shared_conn,
            db_path,
        };

        service.initialize_schema().await?;

        Ok(service)
    }

    /// In-memory database for tests
    pub async fn new_in_memory() -> Result<Self, DatabaseError> {
        Self::new(PathBuf::from(":memory:")).await
    }

    /// Path this database was opened at
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Create a raw connection handle
    ///
    /// For `:memory:` databases this is a clone of the single shared
    /// connection; for on-disk databases, a fresh connection.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        if let Some(conn) = &self.shared_conn {
            return Ok(conn.clone());
        }
        self.db
            .connect()
            .map_err(|e| DatabaseError::connection_failed(self.db_path.clone(), e))
    }

    /// Create a connection with a busy timeout set
    ///
    /// Default choice in async contexts: the timeout makes concurrent
    /// writers wait for the lock instead of failing with `SQLITE_BUSY`.
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;
        Ok(conn)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so query() is required instead of
    /// execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to prepare '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize schema and SQLite configuration (idempotent)
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS entities (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                display_name TEXT,
                handle TEXT,
                avatar_url TEXT,
                bio TEXT,
                properties JSON NOT NULL DEFAULT '{}',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create entities table: {}", e))
        })?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_entities_kind ON entities(kind)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create kind index: {}", e))
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS graph_reconciliation (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                external_id TEXT NOT NULL,
                action TEXT NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!(
                "Failed to create graph_reconciliation table: {}",
                e
            ))
        })?;

        Ok(())
    }
}
