//! Content Table Registry
//!
//! The closed set of content tables this crate operates on, with the
//! per-table metadata the services need: whether a table is
//! self-hierarchical, and whether it participates in the global slug
//! namespace.
//!
//! The scan order of [`EntityTable::SLUG_NAMESPACE`] is part of the
//! observable contract: the slug check reports the *first* colliding table
//! in this order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A content table known to the subsystem.
///
/// Table names are compile-time constants drawn from this enum only; they
/// are never taken from caller input, so they are safe to interpolate into
/// SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityTable {
    /// Geographic places (self-hierarchical, slug namespace)
    Places,
    /// Articles (self-hierarchical, slug namespace)
    Articles,
    /// Navigation menu items (self-hierarchical)
    Menus,
    /// Trip packages (flat, slug namespace; borrow a place's ancestry)
    Packages,
    /// Blog posts (flat, slug namespace)
    Blogs,
    /// Customer testimonials (flat)
    Testimonials,
}

impl EntityTable {
    /// Tables participating in the global slug namespace, in the fixed scan
    /// order used by the conflict check.
    pub const SLUG_NAMESPACE: [EntityTable; 4] = [
        EntityTable::Places,
        EntityTable::Articles,
        EntityTable::Packages,
        EntityTable::Blogs,
    ];

    /// All content tables.
    pub const ALL: [EntityTable; 6] = [
        EntityTable::Places,
        EntityTable::Articles,
        EntityTable::Menus,
        EntityTable::Packages,
        EntityTable::Blogs,
        EntityTable::Testimonials,
    ];

    /// SQL table name.
    pub const fn table_name(&self) -> &'static str {
        match self {
            EntityTable::Places => "places",
            EntityTable::Articles => "articles",
            EntityTable::Menus => "menus",
            EntityTable::Packages => "packages",
            EntityTable::Blogs => "blogs",
            EntityTable::Testimonials => "testimonials",
        }
    }

    /// Human-readable singular name, used in conflict and error messages.
    pub const fn display_name(&self) -> &'static str {
        match self {
            EntityTable::Places => "Place",
            EntityTable::Articles => "Article",
            EntityTable::Menus => "Menu",
            EntityTable::Packages => "Package",
            EntityTable::Blogs => "Blog",
            EntityTable::Testimonials => "Testimonial",
        }
    }

    /// Whether rows of this table form a self-referencing hierarchy.
    pub const fn is_hierarchical(&self) -> bool {
        matches!(
            self,
            EntityTable::Places | EntityTable::Articles | EntityTable::Menus
        )
    }

    /// Whether this table's live slugs participate in the global namespace.
    pub fn in_slug_namespace(&self) -> bool {
        Self::SLUG_NAMESPACE.contains(self)
    }
}

impl fmt::Display for EntityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hierarchical_tables() {
        assert!(EntityTable::Places.is_hierarchical());
        assert!(EntityTable::Articles.is_hierarchical());
        assert!(EntityTable::Menus.is_hierarchical());
        assert!(!EntityTable::Packages.is_hierarchical());
        assert!(!EntityTable::Blogs.is_hierarchical());
        assert!(!EntityTable::Testimonials.is_hierarchical());
    }

    #[test]
    fn test_slug_namespace_order() {
        // The scan order is observable: first collision wins.
        assert_eq!(
            EntityTable::SLUG_NAMESPACE,
            [
                EntityTable::Places,
                EntityTable::Articles,
                EntityTable::Packages,
                EntityTable::Blogs,
            ]
        );
        assert!(!EntityTable::Menus.in_slug_namespace());
        assert!(!EntityTable::Testimonials.in_slug_namespace());
    }

    #[test]
    fn test_table_names() {
        assert_eq!(EntityTable::Places.table_name(), "places");
        assert_eq!(EntityTable::Places.display_name(), "Place");
        assert_eq!(EntityTable::Testimonials.to_string(), "testimonials");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&EntityTable::Places).unwrap();
        assert_eq!(json, r#""places""#);

        let table: EntityTable = serde_json::from_str(r#""blogs""#).unwrap();
        assert_eq!(table, EntityTable::Blogs);
    }
}
