//! MemoryStore - In-Memory ContentStore Implementation
//!
//! A deterministic, dependency-free implementation of [`ContentStore`] over
//! per-table row vectors. Used by the service test suites and suitable for
//! embedded/ephemeral use; rows live only as long as the store.
//!
//! Insertion order is preserved per table, matching the `rowid` ordering of
//! the libsql backend, so tree and trash views behave identically on both.

use crate::db::content_store::ContentStore;
use crate::models::{EntityTable, Node};
use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    /// Rows per table, in insertion order
    tables: HashMap<EntityTable, Vec<Node>>,
    /// package→place associations, in insertion order
    package_places: Vec<(String, String)>,
}

/// In-memory ContentStore implementation.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::db::{ContentStore, MemoryStore};
/// use waypoint_core::models::{EntityTable, Node};
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let store = MemoryStore::new();
/// store
///     .insert(EntityTable::Places, Node::new("Asia", "Asia", "asia", None))
///     .await?;
/// assert_eq!(store.select_live(EntityTable::Places).await?.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn select_live(&self, table: EntityTable) -> Result<Vec<Node>> {
        let state = self.state.read().await;
        Ok(state
            .tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|n| !n.is_trashed())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn select_trashed(&self, table: EntityTable) -> Result<Vec<Node>> {
        let state = self.state.read().await;
        Ok(state
            .tables
            .get(&table)
            .map(|rows| rows.iter().filter(|n| n.is_trashed()).cloned().collect())
            .unwrap_or_default())
    }

    async fn select_by_id(&self, table: EntityTable, id: &str) -> Result<Option<Node>> {
        let state = self.state.read().await;
        Ok(state
            .tables
            .get(&table)
            .and_then(|rows| rows.iter().find(|n| n.id == id))
            .cloned())
    }

    async fn find_live_slug(
        &self,
        table: EntityTable,
        slug: &str,
        exclude_id: Option<&str>,
    ) -> Result<Option<Node>> {
        let state = self.state.read().await;
        Ok(state
            .tables
            .get(&table)
            .and_then(|rows| {
                rows.iter().find(|n| {
                    n.slug == slug && !n.is_trashed() && exclude_id != Some(n.id.as_str())
                })
            })
            .cloned())
    }

    async fn insert(&self, table: EntityTable, node: Node) -> Result<Node> {
        let mut state = self.state.write().await;
        let rows = state.tables.entry(table).or_default();

        if rows.iter().any(|n| n.id == node.id) {
            bail!("Row already exists in {}: {}", table, node.id);
        }

        rows.push(node.clone());
        Ok(node)
    }

    async fn update(&self, table: EntityTable, node: Node) -> Result<Node> {
        let mut state = self.state.write().await;
        let rows = state.tables.entry(table).or_default();

        match rows.iter_mut().find(|n| n.id == node.id) {
            Some(slot) => {
                *slot = node.clone();
                Ok(node)
            }
            None => bail!("Row not found in {}: {}", table, node.id),
        }
    }

    async fn set_deleted_at(
        &self,
        table: EntityTable,
        id: &str,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let mut state = self.state.write().await;
        let rows = state.tables.entry(table).or_default();

        match rows.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.deleted_at = deleted_at;
                node.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_row(&self, table: EntityTable, id: &str) -> Result<bool> {
        let mut state = self.state.write().await;
        let rows = state.tables.entry(table).or_default();

        let before = rows.len();
        rows.retain(|n| n.id != id);
        Ok(rows.len() < before)
    }

    async fn package_primary_place(&self, package_id: &str) -> Result<Option<Node>> {
        let state = self.state.read().await;

        // First association wins (insertion order), matching the libsql
        // backend's ORDER BY rowid LIMIT 1.
        let place_id = state
            .package_places
            .iter()
            .find(|(pkg, _)| pkg == package_id)
            .map(|(_, place)| place.clone());

        Ok(place_id.and_then(|pid| {
            state
                .tables
                .get(&EntityTable::Places)
                .and_then(|rows| rows.iter().find(|n| n.id == pid))
                .cloned()
        }))
    }

    async fn link_package_place(&self, package_id: &str, place_id: &str) -> Result<()> {
        let mut state = self.state.write().await;

        let exists = state
            .package_places
            .iter()
            .any(|(pkg, place)| pkg == package_id && place == place_id);
        if !exists {
            state
                .package_places
                .push((package_id.to_string(), place_id.to_string()));
        }

        Ok(())
    }
}
