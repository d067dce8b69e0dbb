//! SqliteStore - ContentStore Implementation for the libsql Backend
//!
//! Thin wrapper around [`DatabaseService`] that implements [`ContentStore`]
//! with prepared statements and row → [`Node`] conversion. No business
//! logic lives here; the service layer owns hierarchy, trash, and slug
//! rules.
//!
//! Table names interpolated into SQL text come from the closed
//! [`EntityTable`] enum only, never from caller input.
//!
//! # Examples
//!
//! ```rust,no_run
//! use waypoint_core::db::{ContentStore, DatabaseService, SqliteStore};
//! use waypoint_core::models::EntityTable;
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/waypoint.db")).await?);
//!     let store: Arc<dyn ContentStore> = Arc::new(SqliteStore::new(db));
//!
//!     let places = store.select_live(EntityTable::Places).await?;
//!     Ok(())
//! }
//! ```

use crate::db::content_store::ContentStore;
use crate::db::DatabaseService;
use crate::models::{EntityTable, Node};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::Row;
use std::sync::Arc;

/// ContentStore implementation backed by libsql.
pub struct SqliteStore {
    /// Underlying database service (connection + schema management)
    db: Arc<DatabaseService>,
}

/// Shared SELECT column list. Non-hierarchical tables have no `parentId`
/// column, so a NULL placeholder keeps every row shape identical for the
/// converter.
fn select_columns(table: EntityTable) -> &'static str {
    if table.is_hierarchical() {
        "id, title, urlTitle, slug, parentId, status, deletedAt, createdAt, updatedAt"
    } else {
        "id, title, urlTitle, slug, NULL AS parentId, status, deletedAt, createdAt, updatedAt"
    }
}

/// Parse a stored timestamp.
///
/// Rows written by this crate carry RFC 3339; rows seeded by external tools
/// may carry SQLite's `YYYY-MM-DD HH:MM:SS` format, so both are accepted.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("Unrecognized timestamp format: {}", raw))?;
    Ok(naive.and_utc())
}

/// Convert a result row (in `select_columns` order) into a Node.
fn node_from_row(row: &Row) -> Result<Node> {
    let id: String = row.get(0).context("Failed to get id")?;
    let title: String = row.get(1).context("Failed to get title")?;
    let url_title: String = row.get(2).context("Failed to get urlTitle")?;
    let slug: String = row.get(3).context("Failed to get slug")?;
    let parent_id: Option<String> = row.get(4).context("Failed to get parentId")?;
    let status: i64 = row.get(5).context("Failed to get status")?;
    let deleted_at_raw: Option<String> = row.get(6).context("Failed to get deletedAt")?;
    let created_at_raw: String = row.get(7).context("Failed to get createdAt")?;
    let updated_at_raw: String = row.get(8).context("Failed to get updatedAt")?;

    let deleted_at = deleted_at_raw.as_deref().map(parse_timestamp).transpose()?;

    Ok(Node {
        id,
        title,
        url_title,
        slug,
        parent_id,
        status: status != 0,
        deleted_at,
        created_at: parse_timestamp(&created_at_raw)?,
        updated_at: parse_timestamp(&updated_at_raw)?,
    })
}

impl SqliteStore {
    /// Create a new SqliteStore over an initialized DatabaseService.
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Run a listing query filtered on the trash marker.
    ///
    /// `rowid` ordering preserves insertion order, which the tree builder
    /// relies on for stable sibling ordering.
    async fn select_filtered(&self, table: EntityTable, trashed: bool) -> Result<Vec<Node>> {
        let conn = self.db.connect_with_timeout().await?;

        let predicate = if trashed {
            "deletedAt IS NOT NULL"
        } else {
            "deletedAt IS NULL"
        };
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY rowid",
            select_columns(table),
            table.table_name(),
            predicate
        );

        let mut stmt = conn
            .prepare(&sql)
            .await
            .with_context(|| format!("Failed to prepare listing query for {}", table))?;

        let mut rows = stmt
            .query(())
            .await
            .with_context(|| format!("Failed to execute listing query for {}", table))?;

        let mut nodes = Vec::new();
        while let Some(row) = rows.next().await? {
            nodes.push(node_from_row(&row)?);
        }

        Ok(nodes)
    }
}

#[async_trait]
impl ContentStore for SqliteStore {
    async fn select_live(&self, table: EntityTable) -> Result<Vec<Node>> {
        self.select_filtered(table, false).await
    }

    async fn select_trashed(&self, table: EntityTable) -> Result<Vec<Node>> {
        self.select_filtered(table, true).await
    }

    async fn select_by_id(&self, table: EntityTable, id: &str) -> Result<Option<Node>> {
        let conn = self.db.connect_with_timeout().await?;

        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?",
            select_columns(table),
            table.table_name()
        );

        let mut stmt = conn
            .prepare(&sql)
            .await
            .with_context(|| format!("Failed to prepare get query for {}", table))?;

        let mut rows = stmt
            .query([id])
            .await
            .with_context(|| format!("Failed to execute get query for {}", table))?;

        match rows.next().await? {
            Some(row) => Ok(Some(node_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_live_slug(
        &self,
        table: EntityTable,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Node>> {
        let conn = self.db.connect_with_timeout().await?;

        let row = match exclude_id {
            Some(exclude) => {
                let sql = format!(
                    "SELECT {} FROM {} WHERE slug = ? AND id != ? AND deletedAt IS NULL LIMIT 1",
                    select_columns(table),
                    table.table_name()
                );
                let mut stmt = conn
                    .prepare(&sql)
                    .await
                    .with_context(|| format!("Failed to prepare slug query for {}", table))?;
                let mut rows = stmt
                    .query((slug, exclude))
                    .await
                    .with_context(|| format!("Failed to execute slug query for {}", table))?;
                rows.next().await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM {} WHERE slug = ? AND deletedAt IS NULL LIMIT 1",
                    select_columns(table),
                    table.table_name()
                );
                let mut stmt = conn
                    .prepare(&sql)
                    .await
                    .with_context(|| format!("Failed to prepare slug query for {}", table))?;
                let mut rows = stmt
                    .query([slug])
                    .await
                    .with_context(|| format!("Failed to execute slug query for {}", table))?;
                rows.next().await?
            }
        };

        match row {
            Some(row) => Ok(Some(node_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn insert(&self, table: EntityTable, node: Node) -> Result<Node> {
        let conn = self.db.connect_with_timeout().await?;

        let deleted_at = node.deleted_at.map(|ts| ts.to_rfc3339());
        let created_at = node.created_at.to_rfc3339();
        let updated_at = node.updated_at.to_rfc3339();

        if table.is_hierarchical() {
            let sql = format!(
                "INSERT INTO {} (id, title, urlTitle, slug, parentId, status, deletedAt, createdAt, updatedAt)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                table.table_name()
            );
            conn.execute(
                &sql,
                (
                    node.id.as_str(),
                    node.title.as_str(),
                    node.url_title.as_str(),
                    node.slug.as_str(),
                    node.parent_id.as_deref(),
                    node.status as i64,
                    deleted_at.as_deref(),
                    created_at.as_str(),
                    updated_at.as_str(),
                ),
            )
            .await
            .with_context(|| format!("Failed to insert row into {}", table))?;
        } else {
            let sql = format!(
                "INSERT INTO {} (id, title, urlTitle, slug, status, deletedAt, createdAt, updatedAt)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                table.table_name()
            );
            conn.execute(
                &sql,
                (
                    node.id.as_str(),
                    node.title.as_str(),
                    node.url_title.as_str(),
                    node.slug.as_str(),
                    node.status as i64,
                    deleted_at.as_deref(),
                    created_at.as_str(),
                    updated_at.as_str(),
                ),
            )
            .await
            .with_context(|| format!("Failed to insert row into {}", table))?;
        }

        Ok(node)
    }

    async fn update(&self, table: EntityTable, node: Node) -> Result<Node> {
        let conn = self.db.connect_with_timeout().await?;

        let deleted_at = node.deleted_at.map(|ts| ts.to_rfc3339());
        let updated_at = node.updated_at.to_rfc3339();

        let affected = if table.is_hierarchical() {
            let sql = format!(
                "UPDATE {} SET title = ?, urlTitle = ?, slug = ?, parentId = ?, status = ?, deletedAt = ?, updatedAt = ?
                 WHERE id = ?",
                table.table_name()
            );
            conn.execute(
                &sql,
                (
                    node.title.as_str(),
                    node.url_title.as_str(),
                    node.slug.as_str(),
                    node.parent_id.as_deref(),
                    node.status as i64,
                    deleted_at.as_deref(),
                    updated_at.as_str(),
                    node.id.as_str(),
                ),
            )
            .await
            .with_context(|| format!("Failed to update row in {}", table))?
        } else {
            let sql = format!(
                "UPDATE {} SET title = ?, urlTitle = ?, slug = ?, status = ?, deletedAt = ?, updatedAt = ?
                 WHERE id = ?",
                table.table_name()
            );
            conn.execute(
                &sql,
                (
                    node.title.as_str(),
                    node.url_title.as_str(),
                    node.slug.as_str(),
                    node.status as i64,
                    deleted_at.as_deref(),
                    updated_at.as_str(),
                    node.id.as_str(),
                ),
            )
            .await
            .with_context(|| format!("Failed to update row in {}", table))?
        };

        if affected == 0 {
            anyhow::bail!("Row not found in {}: {}", table, node.id);
        }

        Ok(node)
    }

    async fn set_deleted_at(
        &self,
        table: EntityTable,
        id: &str,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let conn = self.db.connect_with_timeout().await?;

        let marker = deleted_at.map(|ts| ts.to_rfc3339());
        let now = Utc::now().to_rfc3339();

        let sql = format!(
            "UPDATE {} SET deletedAt = ?, updatedAt = ? WHERE id = ?",
            table.table_name()
        );
        let affected = conn
            .execute(&sql, (marker.as_deref(), now.as_str(), id))
            .await
            .with_context(|| format!("Failed to set trash marker in {}", table))?;

        Ok(affected > 0)
    }

    async fn delete_row(&self, table: EntityTable, id: &str) -> Result<bool> {
        let conn = self.db.connect_with_timeout().await?;

        let sql = format!("DELETE FROM {} WHERE id = ?", table.table_name());
        let affected = conn
            .execute(&sql, [id])
            .await
            .with_context(|| format!("Failed to delete row from {}", table))?;

        Ok(affected > 0)
    }

    async fn package_primary_place(&self, package_id: &str) -> Result<Option<Node>> {
        let conn = self.db.connect_with_timeout().await?;

        // Lowest association rowid wins, so the pick is deterministic.
        let sql = "SELECT p.id, p.title, p.urlTitle, p.slug, p.parentId, p.status, p.deletedAt, p.createdAt, p.updatedAt
                   FROM places p
                   JOIN package_places pp ON p.id = pp.placeId
                   WHERE pp.packageId = ?
                   ORDER BY pp.id
                   LIMIT 1";

        let mut stmt = conn
            .prepare(sql)
            .await
            .context("Failed to prepare package place query")?;

        let mut rows = stmt
            .query([package_id])
            .await
            .context("Failed to execute package place query")?;

        match rows.next().await? {
            Some(row) => Ok(Some(node_from_row(&row)?)),
            None => Ok(None),
        }
    }

    async fn link_package_place(&self, package_id: &str, place_id: &str) -> Result<()> {
        let conn = self.db.connect_with_timeout().await?;

        conn.execute(
            "INSERT OR IGNORE INTO package_places (packageId, placeId) VALUES (?, ?)",
            (package_id, place_id),
        )
        .await
        .context("Failed to link package to place")?;

        Ok(())
    }
}
