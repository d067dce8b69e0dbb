//! Content Service - Row Lifecycle and Listing Operations
//!
//! The mutation and listing surface wrapped around the integrity
//! components:
//!
//! - Forest and trash listings (delegating to the pure builders)
//! - Create/update, gated by the global slug check
//! - Trash, restore, permanent delete, and their bulk variants
//!
//! # Trash semantics
//!
//! Trashing a row never cascades to its descendants; the trash view merely
//! displays the resulting nesting. Restore and permanent delete re-validate
//! the ancestor chain at mutation time and refuse to act while any ancestor
//! is trashed, so a caller bypassing the UI cannot produce a live row under
//! a trashed parent. Bulk operations are best-effort per id - each failure
//! is recorded and the batch continues; there is no rollback.

use crate::db::ContentStore;
use crate::models::{EntityTable, Node, NodeDraft, NodeUpdate, ValidationError};
use crate::services::breadcrumb::MAX_ANCESTOR_DEPTH;
use crate::services::error::ContentServiceError;
use crate::services::slug::{is_valid_slug, slugify, ReservedSlugs, SlugRegistry};
use crate::services::trash::{build_trash_view, TrashEntry};
use crate::services::tree::{build_forest, TreeNode};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of a bulk restore or bulk permanent delete.
///
/// Bulk operations are best-effort: every id is attempted independently and
/// failures don't abort the batch.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOutcome {
    /// Ids the operation succeeded for, in request order
    pub succeeded: Vec<String>,

    /// Ids the operation was refused or failed for, with the reason
    pub skipped: Vec<SkippedId>,
}

/// One skipped id of a bulk operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedId {
    /// The id that was not acted on
    pub id: String,

    /// Human-readable reason
    pub reason: String,
}

/// Business service for content rows.
///
/// # Examples
///
/// ```rust,no_run
/// use waypoint_core::db::MemoryStore;
/// use waypoint_core::models::{EntityTable, NodeDraft};
/// use waypoint_core::services::ContentService;
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = ContentService::new(Arc::new(MemoryStore::new()));
///
/// let asia = service
///     .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
///     .await?;
/// let forest = service.list_forest(EntityTable::Places).await?;
/// assert_eq!(forest[0].node.id, asia.id);
/// # Ok(())
/// # }
/// ```
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    slug_registry: SlugRegistry,
}

impl ContentService {
    /// Create a service with the default reserved-slug set.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::with_reserved(store, ReservedSlugs::default())
    }

    /// Create a service with an explicit reserved-slug configuration.
    pub fn with_reserved(store: Arc<dyn ContentStore>, reserved: ReservedSlugs) -> Self {
        let slug_registry = SlugRegistry::new(store.clone(), reserved);
        Self {
            store,
            slug_registry,
        }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// Access the slug registry, e.g. for pre-submit validation endpoints.
    pub fn slug_registry(&self) -> &SlugRegistry {
        &self.slug_registry
    }

    /// All live rows of a table as a nested forest.
    pub async fn list_forest(
        &self,
        table: EntityTable,
    ) -> Result<Vec<TreeNode>, ContentServiceError> {
        let rows = self.store.select_live(table).await?;
        Ok(build_forest(rows))
    }

    /// All trashed rows of a table as the annotated trash forest.
    pub async fn list_trash(
        &self,
        table: EntityTable,
    ) -> Result<Vec<TrashEntry>, ContentServiceError> {
        let rows = self.store.select_trashed(table).await?;
        Ok(build_trash_view(rows))
    }

    /// Create a content row.
    ///
    /// The canonical slug is the draft's explicit slug, or derived from the
    /// url title. The global slug check runs before the write; a collision
    /// rejects the create with the offending source.
    pub async fn create(
        &self,
        table: EntityTable,
        draft: NodeDraft,
    ) -> Result<Node, ContentServiceError> {
        let slug = match &draft.slug {
            Some(slug) => slug.clone(),
            None => slugify(&draft.url_title),
        };
        self.ensure_assignable_slug(table, &slug, None).await?;

        if let Some(parent_id) = &draft.parent_id {
            self.ensure_parent_assignable(table, parent_id, None).await?;
        }

        let mut node = Node::new(draft.title, draft.url_title, slug, draft.parent_id);
        node.status = draft.status;
        node.validate()?;

        let created = self.store.insert(table, node).await?;
        tracing::info!(table = %table, id = %created.id, slug = %created.slug, "Created row");

        Ok(created)
    }

    /// Apply a partial update to a row.
    ///
    /// When the update carries no explicit slug, the canonical slug is
    /// re-derived from the (possibly updated) url title - matching the write
    /// path's derivation on create. The slug check excludes the row itself,
    /// so keeping one's own slug never reports a false conflict.
    pub async fn update(
        &self,
        table: EntityTable,
        id: &str,
        update: NodeUpdate,
    ) -> Result<Node, ContentServiceError> {
        let mut node = self
            .store
            .select_by_id(table, id)
            .await?
            .ok_or_else(|| ContentServiceError::not_found(table, id))?;

        if update.is_empty() {
            return Ok(node);
        }

        if let Some(title) = update.title {
            node.title = title;
        }
        if let Some(url_title) = update.url_title {
            node.url_title = url_title;
        }

        let slug = match update.slug {
            Some(slug) => slug,
            None => slugify(&node.url_title),
        };
        self.ensure_assignable_slug(table, &slug, Some((table, id)))
            .await?;
        node.slug = slug;

        if let Some(parent_update) = update.parent_id {
            match parent_update {
                Some(parent_id) => {
                    self.ensure_parent_assignable(table, &parent_id, Some(id))
                        .await?;
                    node.parent_id = Some(parent_id);
                }
                None => node.parent_id = None,
            }
        }

        if let Some(status) = update.status {
            node.status = status;
        }

        node.validate()?;
        node.touch();

        let updated = self.store.update(table, node).await?;
        tracing::info!(table = %table, id = %updated.id, "Updated row");

        Ok(updated)
    }

    /// Move a row to the trash.
    ///
    /// Sets the trash marker on this row only - descendants stay live and
    /// show up as orphan-promoted roots in live listings until they are
    /// trashed themselves. Trashing an already trashed row is a no-op.
    pub async fn trash(&self, table: EntityTable, id: &str) -> Result<(), ContentServiceError> {
        let node = self
            .store
            .select_by_id(table, id)
            .await?
            .ok_or_else(|| ContentServiceError::not_found(table, id))?;

        if node.is_trashed() {
            return Ok(());
        }

        self.store
            .set_deleted_at(table, id, Some(Utc::now()))
            .await?;
        tracing::info!(table = %table, id = %id, "Trashed row");

        Ok(())
    }

    /// Restore a row from the trash.
    ///
    /// Refused with [`ContentServiceError::AncestorInTrash`] while any
    /// ancestor is trashed: restoring would produce a live row under a
    /// trashed parent. Restoring a live row is a no-op.
    pub async fn restore(&self, table: EntityTable, id: &str) -> Result<(), ContentServiceError> {
        let node = self
            .store
            .select_by_id(table, id)
            .await?
            .ok_or_else(|| ContentServiceError::not_found(table, id))?;

        if !node.is_trashed() {
            return Ok(());
        }

        self.ensure_ancestors_not_trashed(table, &node).await?;

        self.store.set_deleted_at(table, id, None).await?;
        tracing::info!(table = %table, id = %id, "Restored row");

        Ok(())
    }

    /// Permanently delete a trashed row.
    ///
    /// Only rows already in the trash may be purged, and - like restore -
    /// the call is refused while an ancestor is trashed: the row remains
    /// reachable from a still-recoverable parent until that parent is dealt
    /// with.
    pub async fn delete_permanently(
        &self,
        table: EntityTable,
        id: &str,
    ) -> Result<(), ContentServiceError> {
        let node = self
            .store
            .select_by_id(table, id)
            .await?
            .ok_or_else(|| ContentServiceError::not_found(table, id))?;

        if !node.is_trashed() {
            return Err(ContentServiceError::not_trashed(id));
        }

        self.ensure_ancestors_not_trashed(table, &node).await?;

        self.store.delete_row(table, id).await?;
        tracing::info!(table = %table, id = %id, "Permanently deleted row");

        Ok(())
    }

    /// Restore many rows, best-effort per id.
    pub async fn restore_many(
        &self,
        table: EntityTable,
        ids: &[String],
    ) -> Result<BulkOutcome, ContentServiceError> {
        let mut outcome = BulkOutcome::default();

        for id in ids {
            match self.restore(table, id).await {
                Ok(()) => outcome.succeeded.push(id.clone()),
                Err(err) => {
                    tracing::warn!(table = %table, id = %id, error = %err, "Bulk restore skipped id");
                    outcome.skipped.push(SkippedId {
                        id: id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Permanently delete many rows, best-effort per id.
    pub async fn delete_many_permanently(
        &self,
        table: EntityTable,
        ids: &[String],
    ) -> Result<BulkOutcome, ContentServiceError> {
        let mut outcome = BulkOutcome::default();

        for id in ids {
            match self.delete_permanently(table, id).await {
                Ok(()) => outcome.succeeded.push(id.clone()),
                Err(err) => {
                    tracing::warn!(table = %table, id = %id, error = %err, "Bulk delete skipped id");
                    outcome.skipped.push(SkippedId {
                        id: id.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Validate a candidate slug and run the global conflict check.
    ///
    /// Tables outside the slug namespace (menus, testimonials) only get the
    /// shape validation: their slugs are not public path segments, so a
    /// collision with one is meaningless in both directions.
    async fn ensure_assignable_slug(
        &self,
        table: EntityTable,
        slug: &str,
        exclude: Option<(EntityTable, &str)>,
    ) -> Result<(), ContentServiceError> {
        if !is_valid_slug(slug) {
            return Err(ValidationError::InvalidSlug(slug.to_string()).into());
        }

        if !table.in_slug_namespace() {
            return Ok(());
        }

        if let Some(conflict) = self
            .slug_registry
            .check_slug_conflict(slug, exclude)
            .await?
        {
            return Err(ContentServiceError::slug_conflict(conflict));
        }

        Ok(())
    }

    /// Check a parent assignment: the table must be hierarchical, the parent
    /// must exist, and a row may not become its own parent.
    ///
    /// A trashed parent is allowed - the row simply renders as an
    /// orphan-promoted root until the parent is restored.
    async fn ensure_parent_assignable(
        &self,
        table: EntityTable,
        parent_id: &str,
        child_id: Option<&str>,
    ) -> Result<(), ContentServiceError> {
        if !table.is_hierarchical() {
            return Err(ContentServiceError::not_hierarchical(table));
        }

        if child_id == Some(parent_id) {
            return Err(ContentServiceError::invalid_parent(parent_id));
        }

        match self.store.select_by_id(table, parent_id).await? {
            Some(_) => Ok(()),
            None => Err(ContentServiceError::invalid_parent(parent_id)),
        }
    }

    /// Walk the live ancestor chain and refuse if any ancestor is trashed.
    ///
    /// Same walk discipline as the breadcrumb resolver: explicit loop,
    /// visited set, depth cap. A dangling parent ends the walk - the chain
    /// above it is unreachable and imposes no constraint.
    async fn ensure_ancestors_not_trashed(
        &self,
        table: EntityTable,
        node: &Node,
    ) -> Result<(), ContentServiceError> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut cursor = node.parent_id.clone();

        while let Some(parent_id) = cursor {
            if !visited.insert(parent_id.clone()) || visited.len() > MAX_ANCESTOR_DEPTH {
                break;
            }

            let Some(parent) = self.store.select_by_id(table, &parent_id).await? else {
                break;
            };

            if parent.is_trashed() {
                return Err(ContentServiceError::ancestor_in_trash(parent_id));
            }

            cursor = parent.parent_id;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "content_service_test.rs"]
mod content_service_test;
