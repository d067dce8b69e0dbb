//! Database Connection Management
//!
//! This module provides the core database connection and initialization
//! functionality using libsql for Waypoint's content tables.
//!
//! # Architecture
//!
//! - **Path-agnostic**: Accepts any valid PathBuf
//! - **Idempotent schema**: `CREATE TABLE IF NOT EXISTS` on every startup
//! - **WAL mode**: Write-Ahead Logging for better concurrency
//! - **Foreign keys**: Enabled for referential integrity
//!
//! # Database Connection Patterns
//!
//! **ALWAYS use `connect_with_timeout()` in async functions** to avoid SQLite
//! thread-safety violations when the Tokio runtime moves futures between
//! threads. The 5-second busy timeout allows concurrent operations to wait
//! and retry instead of failing immediately with `SQLITE_BUSY` errors.
//!
//! ```no_run
//! # use waypoint_core::db::DatabaseService;
//! # use std::path::PathBuf;
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let db_service = DatabaseService::new(PathBuf::from(":memory:")).await?;
//! let conn = db_service.connect_with_timeout().await?;
//! # Ok(())
//! # }
//! ```

use crate::db::error::DatabaseError;
use crate::models::EntityTable;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service for managing the libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use waypoint_core::db::DatabaseService;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_path = PathBuf::from("./data/waypoint.db");
///     let db_service = DatabaseService::new(db_path).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database connection (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,
}

impl DatabaseService {
    /// Create a new DatabaseService with the specified database path.
    ///
    /// This will:
    /// 1. Ensure the parent directory exists (create if needed)
    /// 2. Open/create the database file
    /// 3. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    /// 4. Enable SQLite features (WAL mode, foreign keys, busy timeout)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if:
    /// - Parent directory cannot be created
    /// - Database connection fails
    /// - Schema initialization fails
    pub async fn new(db_path: PathBuf) -> Result<Self, DatabaseError> {
        // Ensure parent directory exists (":memory:" has an empty parent)
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        // Open database connection using Builder pattern
        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
        };

        service.initialize_schema().await?;

        Ok(service)
    }

    /// Create an in-memory DatabaseService, used by tests.
    pub async fn new_in_memory() -> Result<Self, DatabaseError> {
        Self::new(PathBuf::from(":memory:")).await
    }

    /// Get a connection handle for synchronous contexts.
    ///
    /// Most code should use [`connect_with_timeout`](Self::connect_with_timeout)
    /// instead.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get a connection with the busy timeout applied.
    ///
    /// This is the correct entry point in async functions: the busy timeout
    /// makes concurrent operations wait and retry instead of failing with
    /// `SQLITE_BUSY` when Tokio interleaves writers.
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000")
            .await?;

        Ok(conn)
    }

    /// Execute a PRAGMA statement.
    ///
    /// PRAGMA statements return rows, so we must use query() instead of
    /// execute(). This helper encapsulates that pattern.
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration.
    ///
    /// Creates the content tables, the package↔place association table, and
    /// the core indexes using CREATE TABLE IF NOT EXISTS, so initialization
    /// is idempotent and safe to call on every startup.
    ///
    /// # Schema
    ///
    /// Every content table shares the same row shape:
    ///
    /// - `id` TEXT PRIMARY KEY
    /// - `title`, `urlTitle`, `slug` TEXT NOT NULL
    /// - `parentId` TEXT (hierarchical tables only; same-table reference)
    /// - `status` INTEGER (published flag)
    /// - `deletedAt` TEXT (trash marker, RFC 3339; NULL = live)
    /// - `createdAt` / `updatedAt` TEXT NOT NULL (RFC 3339)
    ///
    /// `package_places` associates packages with the places whose ancestry
    /// they borrow for breadcrumbs.
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        // Enable WAL mode for better concurrency
        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        // Enable foreign key constraints
        self.execute_pragma(&conn, "PRAGMA foreign_keys = ON")
            .await?;

        for table in EntityTable::ALL {
            self.create_content_table(&conn, table).await?;
        }

        // Association table for the package→place ancestry borrow
        conn.execute(
            "CREATE TABLE IF NOT EXISTS package_places (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                packageId TEXT NOT NULL,
                placeId TEXT NOT NULL,
                FOREIGN KEY (packageId) REFERENCES packages(id) ON DELETE CASCADE,
                FOREIGN KEY (placeId) REFERENCES places(id) ON DELETE CASCADE,
                UNIQUE(packageId, placeId)
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create package_places table: {}", e))
        })?;

        self.create_core_indexes(&conn).await?;

        Ok(())
    }

    /// Create one content table.
    ///
    /// Table names come from the closed [`EntityTable`] enum, never from
    /// caller input.
    async fn create_content_table(
        &self,
        conn: &libsql::Connection,
        table: EntityTable,
    ) -> Result<(), DatabaseError> {
        let name = table.table_name();

        // Hierarchical tables carry the self-referencing parentId column.
        // The foreign key deliberately does NOT cascade: trashing or even
        // permanently deleting a parent leaves children in place with a
        // dangling reference, which read paths normalize to "root".
        let sql = if table.is_hierarchical() {
            format!(
                "CREATE TABLE IF NOT EXISTS {name} (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    urlTitle TEXT NOT NULL,
                    slug TEXT NOT NULL,
                    parentId TEXT,
                    status INTEGER NOT NULL DEFAULT 0,
                    deletedAt TEXT,
                    createdAt TEXT NOT NULL,
                    updatedAt TEXT NOT NULL
                )"
            )
        } else {
            format!(
                "CREATE TABLE IF NOT EXISTS {name} (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    urlTitle TEXT NOT NULL,
                    slug TEXT NOT NULL,
                    status INTEGER NOT NULL DEFAULT 0,
                    deletedAt TEXT,
                    createdAt TEXT NOT NULL,
                    updatedAt TEXT NOT NULL
                )"
            )
        };

        conn.execute(&sql, ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to create {} table: {}", name, e))
        })?;

        Ok(())
    }

    /// Create core indexes for the content tables.
    ///
    /// These indexes cover the three hot filters: hierarchy walks
    /// (`parentId`), the cross-table slug scan (`slug`), and the live/trash
    /// split (`deletedAt`).
    async fn create_core_indexes(&self, conn: &libsql::Connection) -> Result<(), DatabaseError> {
        for table in EntityTable::ALL {
            let name = table.table_name();

            if table.is_hierarchical() {
                conn.execute(
                    &format!("CREATE INDEX IF NOT EXISTS idx_{name}_parent ON {name}(parentId)"),
                    (),
                )
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!(
                        "Failed to create index 'idx_{}_parent': {}",
                        name, e
                    ))
                })?;
            }

            conn.execute(
                &format!("CREATE INDEX IF NOT EXISTS idx_{name}_slug ON {name}(slug)"),
                (),
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to create index 'idx_{}_slug': {}",
                    name, e
                ))
            })?;

            conn.execute(
                &format!("CREATE INDEX IF NOT EXISTS idx_{name}_deleted ON {name}(deletedAt)"),
                (),
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!(
                    "Failed to create index 'idx_{}_deleted': {}",
                    name, e
                ))
            })?;
        }

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_package_places_package ON package_places(packageId)",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::sql_execution(format!(
                "Failed to create index 'idx_package_places_package': {}",
                e
            ))
        })?;

        Ok(())
    }
}
