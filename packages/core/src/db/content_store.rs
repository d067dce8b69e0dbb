//! ContentStore Trait - Storage Abstraction Layer
//!
//! This module defines the `ContentStore` trait that abstracts row storage
//! for Waypoint's content tables. The trait decouples the service layer
//! (trees, trash views, slug checks, breadcrumbs) from the database
//! implementation, so the same business logic runs against the embedded
//! libsql backend and the in-memory backend used by tests.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async to support embedded and
//!    networked backends alike
//! 2. **Error Handling**: Uses `anyhow::Result` for flexible error context
//!    at the storage boundary; services translate into their own error type
//! 3. **Missing rows are not errors**: lookups return `Ok(None)`
//!
//! # Examples
//!
//! ```rust,no_run
//! use waypoint_core::db::{ContentStore, MemoryStore};
//! use waypoint_core::models::{EntityTable, Node};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
//!
//!     let node = Node::new("Asia", "Asia", "asia", None);
//!     let created = store.insert(EntityTable::Places, node).await?;
//!     println!("Created row: {}", created.id);
//!
//!     Ok(())
//! }
//! ```

use crate::models::{EntityTable, Node};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Abstraction layer for content row persistence.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow usage in async contexts
/// where futures may be moved between threads.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All live rows of a table (`deletedAt IS NULL`), in insertion order.
    ///
    /// This feeds the tree builder; callers rely on the returned order being
    /// stable across calls.
    async fn select_live(&self, table: EntityTable) -> Result<Vec<Node>>;

    /// All trashed rows of a table (`deletedAt IS NOT NULL`), in insertion
    /// order. Feeds the trash cascade view.
    async fn select_trashed(&self, table: EntityTable) -> Result<Vec<Node>>;

    /// Fetch a single row by ID, live or trashed.
    ///
    /// Returns `Ok(None)` when the row doesn't exist (not an error).
    async fn select_by_id(&self, table: EntityTable, id: &str) -> Result<Option<Node>>;

    /// Find a live row holding the given slug.
    ///
    /// When `exclude_id` is provided, a row with that ID is ignored - this
    /// supports "editing a row, keep its own slug" without false positives.
    /// Trashed rows never match: a slug becomes available again the moment
    /// its owner is trashed.
    async fn find_live_slug(
        &self,
        table: EntityTable,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Node>>;

    /// Insert a new row.
    ///
    /// # Errors
    ///
    /// Returns an error if the row ID already exists in the table.
    async fn insert(&self, table: EntityTable, node: Node) -> Result<Node>;

    /// Overwrite an existing row (full-row write).
    ///
    /// # Errors
    ///
    /// Returns an error if the row doesn't exist.
    async fn update(&self, table: EntityTable, node: Node) -> Result<Node>;

    /// Set or clear the trash marker on a row.
    ///
    /// Returns `true` if a row was updated, `false` if no such row exists.
    /// This is the only mutation the trash lifecycle performs; it is never
    /// propagated to descendants by the store.
    async fn set_deleted_at(
        &self,
        table: EntityTable,
        id: &str,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<bool>;

    /// Physically delete a row.
    ///
    /// Returns `true` if a row was deleted, `false` if no such row exists.
    async fn delete_row(&self, table: EntityTable, id: &str) -> Result<bool>;

    /// The place whose ancestry a package borrows for breadcrumbs.
    ///
    /// When several places are associated, the first association (lowest
    /// association rowid, i.e. insertion order) wins. Returns `Ok(None)`
    /// when the package has no associated place.
    async fn package_primary_place(&self, package_id: &str) -> Result<Option<Node>>;

    /// Associate a package with a place. Idempotent for an existing pair.
    async fn link_package_place(&self, package_id: &str, place_id: &str) -> Result<()>;
}
