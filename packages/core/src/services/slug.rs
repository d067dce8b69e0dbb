//! Global Slug Registry
//!
//! Slugs are public URL path segments shared by several content types in one
//! flat namespace, so uniqueness must be enforced *across* tables - a
//! per-table unique constraint in storage is not sufficient. This module
//! performs that check, plus the reserved-word check that keeps content
//! slugs from shadowing application routes.
//!
//! The check is read-only: it persists nothing and must run before every
//! create/update of a slug-carrying row.
//!
//! Trashed rows never block a slug - a previously used slug becomes
//! available again the moment its owner is soft-deleted. That is a design
//! choice (reuse without manual cleanup), not an oversight.

use crate::db::ContentStore;
use crate::models::EntityTable;
use crate::services::error::ContentServiceError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Synthetic conflict source reported when a candidate matches a reserved
/// route token rather than a content row.
pub const SYSTEM_ROUTE: &str = "System Route";

/// Route tokens content slugs must never shadow: administrative and
/// authentication segments plus the fixed section routes of the application.
const DEFAULT_RESERVED: &[&str] = &[
    "admin",
    "api",
    "login",
    "logout",
    "dashboard",
    "users",
    "authors",
    "teams",
    "menus",
    "blogs",
    "testimonials",
    "about",
    "contact",
    "uploads",
    "trash",
    "search",
];

// Canonical slug shape: lowercase alphanumeric runs joined by single dashes
const SLUG_PATTERN: &str = r"^[a-z0-9]+(?:-[a-z0-9]+)*$";

/// Immutable reserved-word configuration for the registry.
///
/// Always an explicit value passed in at construction - never a hidden
/// global - so the check stays pure and testable. Matching is
/// case-insensitive.
#[derive(Debug, Clone)]
pub struct ReservedSlugs {
    words: Vec<String>,
}

impl ReservedSlugs {
    /// Build a reserved set from arbitrary tokens.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(|w| w.into().to_lowercase()).collect(),
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, candidate: &str) -> bool {
        let lowered = candidate.to_lowercase();
        self.words.iter().any(|w| *w == lowered)
    }
}

impl Default for ReservedSlugs {
    /// The application's route segments.
    fn default() -> Self {
        Self::new(DEFAULT_RESERVED.iter().copied())
    }
}

/// A detected slug collision.
///
/// `source` names the colliding origin: a content table's display name, or
/// [`SYSTEM_ROUTE`] for reserved tokens (in which case `id` is `None`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlugConflict {
    /// Display name of the colliding table, or `"System Route"`
    pub source: String,

    /// ID of the colliding row; `None` for reserved tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl SlugConflict {
    fn reserved() -> Self {
        Self {
            source: SYSTEM_ROUTE.to_string(),
            id: None,
        }
    }

    fn row(table: EntityTable, id: String) -> Self {
        Self {
            source: table.display_name().to_string(),
            id: Some(id),
        }
    }
}

impl fmt::Display for SlugConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} ({})", self.source, id),
            None => f.write_str(&self.source),
        }
    }
}

/// Derive the canonical slug from a human-edited url title.
///
/// Lowercases, collapses every non-alphanumeric run to a single dash, and
/// trims leading/trailing dashes.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::services::slugify;
///
/// assert_eq!(slugify("Everest Trek"), "everest-trek");
/// assert_eq!(slugify("  Base Camp -- 2026!  "), "base-camp-2026");
/// ```
pub fn slugify(url_title: &str) -> String {
    let mut slug = String::with_capacity(url_title.len());
    let mut pending_dash = false;

    for ch in url_title.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Check a slug against the canonical shape.
pub fn is_valid_slug(slug: &str) -> bool {
    static SLUG_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = SLUG_REGEX.get_or_init(|| Regex::new(SLUG_PATTERN).unwrap());
    regex.is_match(slug)
}

/// The global slug namespace check.
///
/// # Examples
///
/// ```rust,no_run
/// use waypoint_core::db::MemoryStore;
/// use waypoint_core::services::{ReservedSlugs, SlugRegistry};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SlugRegistry::new(Arc::new(MemoryStore::new()), ReservedSlugs::default());
///
/// let conflict = registry.check_slug_conflict("admin", None).await?;
/// assert_eq!(conflict.unwrap().source, "System Route");
/// # Ok(())
/// # }
/// ```
pub struct SlugRegistry {
    store: Arc<dyn ContentStore>,
    reserved: ReservedSlugs,
}

impl SlugRegistry {
    /// Create a registry over a store with the given reserved-word set.
    pub fn new(store: Arc<dyn ContentStore>, reserved: ReservedSlugs) -> Self {
        Self { store, reserved }
    }

    /// Check a candidate slug for conflicts.
    ///
    /// Order of checks (the fixed table order is part of the observable
    /// contract - the first colliding source wins):
    ///
    /// 1. Reserved tokens, case-insensitively → `"System Route"` conflict.
    /// 2. Live rows of each namespace table (places, articles, packages,
    ///    blogs), short-circuiting on the first hit.
    ///
    /// `exclude` names a row allowed to keep its own slug, so editing a row
    /// without changing its slug never reports a false positive.
    ///
    /// Returns `Ok(None)` when the candidate is free.
    pub async fn check_slug_conflict(
        &self,
        candidate: &str,
        exclude: Option<(EntityTable, &str)>,
    ) -> Result<Option<SlugConflict>, ContentServiceError> {
        if self.reserved.contains(candidate) {
            tracing::debug!(slug = candidate, "Slug collides with reserved route");
            return Ok(Some(SlugConflict::reserved()));
        }

        for table in EntityTable::SLUG_NAMESPACE {
            let exclude_id = exclude
                .filter(|(excluded_table, _)| *excluded_table == table)
                .map(|(_, id)| id);

            if let Some(row) = self
                .store
                .find_live_slug(table, candidate, exclude_id)
                .await?
            {
                tracing::debug!(
                    slug = candidate,
                    table = %table,
                    row = %row.id,
                    "Slug collides with live row"
                );
                return Ok(Some(SlugConflict::row(table, row.id)));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Everest Trek"), "everest-trek");
        assert_eq!(slugify("Kathmandu"), "kathmandu");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("  Base Camp -- 2026!  "), "base-camp-2026");
        assert_eq!(slugify("A   &   B"), "a-b");
    }

    #[test]
    fn test_slugify_empty_and_symbol_only() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_is_valid_slug() {
        assert!(is_valid_slug("everest-trek"));
        assert!(is_valid_slug("a"));
        assert!(is_valid_slug("trek-2026"));

        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("Everest"));
        assert!(!is_valid_slug("-trek"));
        assert!(!is_valid_slug("trek-"));
        assert!(!is_valid_slug("a--b"));
        assert!(!is_valid_slug("a b"));
    }

    #[test]
    fn test_reserved_is_case_insensitive() {
        let reserved = ReservedSlugs::default();

        assert!(reserved.contains("admin"));
        assert!(reserved.contains("Admin"));
        assert!(reserved.contains("LOGIN"));
        assert!(!reserved.contains("everest-trek"));
    }

    #[test]
    fn test_custom_reserved_set() {
        let reserved = ReservedSlugs::new(["Help", "faq"]);

        assert!(reserved.contains("help"));
        assert!(reserved.contains("FAQ"));
        assert!(!reserved.contains("admin"));
    }

    #[test]
    fn test_conflict_display() {
        let reserved = SlugConflict {
            source: SYSTEM_ROUTE.to_string(),
            id: None,
        };
        assert_eq!(reserved.to_string(), "System Route");

        let row = SlugConflict {
            source: "Place".to_string(),
            id: Some("42".to_string()),
        };
        assert_eq!(row.to_string(), "Place (42)");
    }
}

#[cfg(test)]
#[path = "slug_test.rs"]
mod slug_test;
