//! Waypoint Core Business Logic Layer
//!
//! This crate provides the hierarchical content tree, trash, and slug
//! integrity services for the Waypoint content management system, together
//! with its storage layer.
//!
//! # Architecture
//!
//! - **Universal row model**: every content table (places, articles, menus,
//!   packages, blogs, testimonials) shares one `Node` shape
//! - **Parent-pointer hierarchies**: self-referencing `parentId` columns,
//!   reassembled into forests in memory
//! - **Soft delete**: rows are trashed by stamping `deletedAt`, never
//!   cascaded; views and mutation gates handle the resulting nesting
//! - **Global slug namespace**: slugs are unique across content tables and
//!   checked against a reserved route list before every write
//! - **libsql/SQLite**: embedded database backend behind a storage trait
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, EntityTable)
//! - [`services`] - Business services (forests, trash view, slugs,
//!   breadcrumbs, content writes)
//! - [`db`] - Database layer with libsql integration

pub mod db;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
