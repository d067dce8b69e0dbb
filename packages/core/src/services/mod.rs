//! Business Services
//!
//! This module contains the core business logic services:
//!
//! - `build_forest` / `build_trash_view` - pure forest construction from
//!   flat row lists (live listings and the annotated trash view)
//! - `SlugRegistry` - global slug namespace and reserved-word checks
//! - `BreadcrumbResolver` - ancestor-chain breadcrumb resolution, including
//!   the package→place ancestry borrow
//! - `ContentService` - slug-gated row writes and the trash lifecycle
//!
//! Services coordinate between the storage layer and application logic,
//! implementing the hierarchy and integrity rules the calling layers rely
//! on.

pub mod breadcrumb;
pub mod content_service;
pub mod error;
pub mod slug;
pub mod trash;
pub mod tree;

pub use breadcrumb::{
    AncestryProvider, BreadcrumbResolver, BreadcrumbSubject, Crumb, PackagePlaceAncestry,
    MAX_ANCESTOR_DEPTH,
};
pub use content_service::{BulkOutcome, ContentService, SkippedId};
pub use error::ContentServiceError;
pub use slug::{is_valid_slug, slugify, ReservedSlugs, SlugConflict, SlugRegistry, SYSTEM_ROUTE};
pub use trash::{build_trash_view, TrashEntry};
pub use tree::{build_forest, flatten_forest, TreeNode};
