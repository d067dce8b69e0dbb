//! Service Layer Error Types
//!
//! This module defines error types for service-layer operations, providing
//! detailed error handling for business logic failures.

use crate::db::DatabaseError;
use crate::models::{EntityTable, ValidationError};
use crate::services::slug::SlugConflict;
use thiserror::Error;

/// Service operation errors
///
/// Provides high-level error types for all service operations,
/// with detailed context and proper error chaining.
#[derive(Error, Debug)]
pub enum ContentServiceError {
    /// Row not found by ID
    #[error("{} not found: {id}", .table.display_name())]
    NotFound { table: EntityTable, id: String },

    /// Candidate slug collides with a reserved route or a live row
    #[error("Slug is already in use by {conflict}")]
    SlugConflict { conflict: SlugConflict },

    /// Restore or permanent delete attempted while an ancestor is trashed
    #[error("Ancestor {ancestor_id} is in the trash; restore it first")]
    AncestorInTrash { ancestor_id: String },

    /// Hierarchy operation attempted on a flat table
    #[error("Table {} does not support hierarchy", .table.display_name())]
    NotHierarchical { table: EntityTable },

    /// Invalid parent reference
    #[error("Invalid parent row: {parent_id}")]
    InvalidParent { parent_id: String },

    /// Permanent delete attempted on a row that is not in the trash
    #[error("Row {id} is not in the trash")]
    NotTrashed { id: String },

    /// Validation failed for a row
    #[error("Row validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Database operation failed
    #[error("Database operation failed: {0}")]
    DatabaseError(#[from] DatabaseError),

    /// Storage backend failure (trait boundary)
    #[error("Storage operation failed: {0}")]
    StorageError(#[from] anyhow::Error),
}

impl ContentServiceError {
    /// Create a not found error
    pub fn not_found(table: EntityTable, id: impl Into<String>) -> Self {
        Self::NotFound {
            table,
            id: id.into(),
        }
    }

    /// Create a slug conflict error
    pub fn slug_conflict(conflict: SlugConflict) -> Self {
        Self::SlugConflict { conflict }
    }

    /// Create an ancestor-in-trash error
    pub fn ancestor_in_trash(ancestor_id: impl Into<String>) -> Self {
        Self::AncestorInTrash {
            ancestor_id: ancestor_id.into(),
        }
    }

    /// Create a not hierarchical error
    pub fn not_hierarchical(table: EntityTable) -> Self {
        Self::NotHierarchical { table }
    }

    /// Create an invalid parent error
    pub fn invalid_parent(parent_id: impl Into<String>) -> Self {
        Self::InvalidParent {
            parent_id: parent_id.into(),
        }
    }

    /// Create a not trashed error
    pub fn not_trashed(id: impl Into<String>) -> Self {
        Self::NotTrashed { id: id.into() }
    }
}
