//! Data Models
//!
//! This module contains the core data structures used throughout Waypoint:
//!
//! - `Node` - Universal row model for all content tables
//! - `EntityTable` - The closed set of content tables and their metadata
//!
//! Every content table shares the same row shape; the services layer decides
//! which operations apply to which table (hierarchy, slug namespace).

mod entity;
mod node;

pub use entity::EntityTable;
pub use node::{Node, NodeDraft, NodeUpdate, ValidationError};
