//! Content Node Data Structures
//!
//! This module defines the core `Node` struct shared by every content table
//! in Waypoint, plus the write shapes used by the service layer.
//!
//! # Architecture
//!
//! - **Universal row**: one struct represents a row of any content table
//!   (places, articles, menus, packages, blogs, testimonials)
//! - **Self-referencing hierarchy**: `parent_id` points at another row of the
//!   *same* table; `None` means the row is a forest root
//! - **Soft delete**: `deleted_at` is the trash marker; a non-`None` value
//!   means the row is in the trash and invisible to live listings
//!
//! # Examples
//!
//! ```rust
//! use waypoint_core::models::Node;
//!
//! // A root place
//! let asia = Node::new("Asia", "Asia", "asia", None);
//! assert!(asia.is_root());
//!
//! // A child place
//! let nepal = Node::new("Nepal", "Nepal", "nepal", Some(asia.id.clone()));
//! assert!(!nepal.is_root());
//! assert!(!nepal.is_trashed());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for Node operations
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid parent reference: {0}")]
    InvalidParent(String),

    #[error("Invalid slug: {0}")]
    InvalidSlug(String),
}

/// Universal content row for all Waypoint content tables.
///
/// # Fields
///
/// - `id`: unique identifier within the row's table (UUID v4)
/// - `title`: display name
/// - `url_title`: human-edited path segment the slug is derived from
/// - `slug`: canonical unique path segment (globally unique across the slug
///   namespace tables while the row is live)
/// - `parent_id`: optional reference to another row of the same table;
///   `None` means the row is a forest root. Always `None` for rows of
///   non-hierarchical tables (packages, blogs, testimonials)
/// - `status`: published flag, independent of trash state
/// - `deleted_at`: trash marker; `None` = live, `Some(ts)` = trashed
/// - `created_at` / `updated_at`: lifecycle timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Display name
    pub title: String,

    /// Human-edited path segment (slug source)
    pub url_title: String,

    /// Canonical unique path segment
    pub slug: String,

    /// Same-table parent reference; `None` = forest root
    pub parent_id: Option<String>,

    /// Published flag (independent of trash state)
    pub status: bool,

    /// Trash marker; `None` = live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

impl Node {
    /// Create a new live Node with an auto-generated UUID.
    ///
    /// The row starts unpublished (`status = false`) and untrashed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use waypoint_core::models::Node;
    /// let root = Node::new("Asia", "Asia", "asia", None);
    /// let child = Node::new("Nepal", "Nepal", "nepal", Some(root.id.clone()));
    /// assert_eq!(child.parent_id.as_deref(), Some(root.id.as_str()));
    /// ```
    pub fn new(
        title: impl Into<String>,
        url_title: impl Into<String>,
        slug: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            url_title: url_title.into(),
            slug: slug.into(),
            parent_id,
            status: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a new Node with a caller-specified ID.
    ///
    /// Used by tests and by callers that pre-generate IDs for optimistic
    /// client-side tracking.
    pub fn new_with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        url_title: impl Into<String>,
        slug: impl Into<String>,
        parent_id: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: id.into(),
            title: title.into(),
            url_title: url_title.into(),
            slug: slug.into(),
            parent_id,
            status: false,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate row structure and required fields.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - `id`, `title`, or `url_title` is empty
    /// - the row references itself as parent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingField("id".to_string()));
        }

        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title".to_string()));
        }

        if self.url_title.trim().is_empty() {
            return Err(ValidationError::MissingField("urlTitle".to_string()));
        }

        if let Some(parent_id) = &self.parent_id {
            if parent_id == &self.id {
                return Err(ValidationError::InvalidParent(
                    "Row cannot be its own parent".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Check if this row is a forest root (no parent reference).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Check if this row is in the trash.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Bump the modification timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Custom deserializer for optional fields that accepts both plain values and null
///
/// Maps three input formats to the double-Option pattern:
/// - Missing field → None (don't update)
/// - null → Some(None) (set to NULL)
/// - "value" → Some(Some("value")) (set to value)
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Input shape for creating a content row.
///
/// `slug` is optional: when absent the canonical slug is derived from
/// `url_title` before the uniqueness check runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDraft {
    /// Display name
    pub title: String,

    /// Human-edited path segment
    pub url_title: String,

    /// Explicit slug; derived from `url_title` when `None`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Same-table parent reference (hierarchical tables only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Published flag
    #[serde(default)]
    pub status: bool,
}

impl NodeDraft {
    /// Create a draft with just a title and url title.
    pub fn new(title: impl Into<String>, url_title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url_title: url_title.into(),
            ..Default::default()
        }
    }

    /// Set an explicit slug.
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set the parent reference.
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    /// Set the published flag.
    pub fn with_status(mut self, status: bool) -> Self {
        self.status = status;
        self
    }
}

/// Partial update for PATCH-style edits of a content row.
///
/// All fields are optional; only provided fields are changed.
///
/// # Double-Option Pattern for `parent_id`
///
/// - `None`: don't change the parent
/// - `Some(None)`: clear the parent (row becomes a root)
/// - `Some(Some(id))`: reparent under the given row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeUpdate {
    /// Update display name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Update the slug source segment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_title: Option<String>,

    /// Update the slug directly (still subject to the uniqueness check)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Update parent reference (double-Option, see struct docs)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub parent_id: Option<Option<String>>,

    /// Update published flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
}

impl NodeUpdate {
    /// Create a new empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set title update
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set url title update
    pub fn with_url_title(mut self, url_title: impl Into<String>) -> Self {
        self.url_title = Some(url_title.into());
        self
    }

    /// Set slug update
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    /// Set parent update
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(Some(parent_id.into()));
        self
    }

    /// Clear the parent reference (row becomes a root)
    pub fn clear_parent(mut self) -> Self {
        self.parent_id = Some(None);
        self
    }

    /// Set status update
    pub fn with_status(mut self, status: bool) -> Self {
        self.status = Some(status);
        self
    }

    /// Check if the update contains any changes
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url_title.is_none()
            && self.slug.is_none()
            && self.parent_id.is_none()
            && self.status.is_none()
    }
}
