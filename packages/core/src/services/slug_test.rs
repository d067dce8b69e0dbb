//! Store-Backed Tests for the Slug Registry
//!
//! Validates the cross-table namespace scan against the in-memory store:
//! fixed table order, exclude-self editing, and slug reuse after trash.

use crate::db::{ContentStore, MemoryStore};
use crate::models::{EntityTable, Node};
use crate::services::slug::{ReservedSlugs, SlugRegistry, SYSTEM_ROUTE};
use chrono::Utc;
use std::sync::Arc;

async fn create_test_registry() -> (SlugRegistry, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let registry = SlugRegistry::new(store.clone(), ReservedSlugs::default());
    (registry, store)
}

fn row(id: &str, slug: &str) -> Node {
    Node::new_with_id(id, slug, slug, slug, None)
}

#[tokio::test]
async fn test_reserved_word_reports_system_route() {
    let (registry, _store) = create_test_registry().await;

    let conflict = registry
        .check_slug_conflict("admin", None)
        .await
        .unwrap()
        .expect("reserved token must conflict");

    assert_eq!(conflict.source, SYSTEM_ROUTE);
    assert!(conflict.id.is_none());
}

#[tokio::test]
async fn test_reserved_word_case_insensitive() {
    let (registry, _store) = create_test_registry().await;

    let conflict = registry.check_slug_conflict("Admin", None).await.unwrap();
    assert!(conflict.is_some());
}

#[tokio::test]
async fn test_free_slug_reports_no_conflict() {
    let (registry, _store) = create_test_registry().await;

    let conflict = registry
        .check_slug_conflict("everest-trek", None)
        .await
        .unwrap();
    assert!(conflict.is_none());
}

#[tokio::test]
async fn test_cross_table_collision_reported() {
    let (registry, store) = create_test_registry().await;

    store
        .insert(EntityTable::Blogs, row("b-1", "everest-trek"))
        .await
        .unwrap();

    // A places write collides with the blog row: the namespace spans tables
    let conflict = registry
        .check_slug_conflict("everest-trek", None)
        .await
        .unwrap()
        .expect("cross-table collision must be reported");

    assert_eq!(conflict.source, "Blog");
    assert_eq!(conflict.id.as_deref(), Some("b-1"));
}

#[tokio::test]
async fn test_first_table_in_scan_order_wins() {
    let (registry, store) = create_test_registry().await;

    // Same slug in two namespace tables; places precedes blogs in the scan
    store
        .insert(EntityTable::Blogs, row("b-1", "shared"))
        .await
        .unwrap();
    store
        .insert(EntityTable::Places, row("p-1", "shared"))
        .await
        .unwrap();

    let conflict = registry
        .check_slug_conflict("shared", None)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(conflict.source, "Place");
    assert_eq!(conflict.id.as_deref(), Some("p-1"));
}

#[tokio::test]
async fn test_exclude_self_keeps_own_slug() {
    let (registry, store) = create_test_registry().await;

    store
        .insert(EntityTable::Places, row("42", "everest-trek"))
        .await
        .unwrap();

    // Editing row 42 without changing its slug: no false positive
    let conflict = registry
        .check_slug_conflict("everest-trek", Some((EntityTable::Places, "42")))
        .await
        .unwrap();
    assert!(conflict.is_none());

    // A different row still conflicts
    let conflict = registry
        .check_slug_conflict("everest-trek", Some((EntityTable::Places, "43")))
        .await
        .unwrap();
    assert!(conflict.is_some());
}

#[tokio::test]
async fn test_exclude_only_applies_to_its_table() {
    let (registry, store) = create_test_registry().await;

    store
        .insert(EntityTable::Packages, row("42", "everest-trek"))
        .await
        .unwrap();

    // Excluding id 42 in *places* must not mask the package with the same id
    let conflict = registry
        .check_slug_conflict("everest-trek", Some((EntityTable::Places, "42")))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(conflict.source, "Package");
}

#[tokio::test]
async fn test_trashed_row_frees_its_slug() {
    let (registry, store) = create_test_registry().await;

    store
        .insert(EntityTable::Places, row("p-1", "everest-trek"))
        .await
        .unwrap();
    assert!(registry
        .check_slug_conflict("everest-trek", None)
        .await
        .unwrap()
        .is_some());

    // Soft-deleting the owner releases the slug without manual cleanup
    store
        .set_deleted_at(EntityTable::Places, "p-1", Some(Utc::now()))
        .await
        .unwrap();

    assert!(registry
        .check_slug_conflict("everest-trek", None)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_custom_reserved_set_replaces_default() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());
    let registry = SlugRegistry::new(store, ReservedSlugs::new(["help"]));

    assert!(registry
        .check_slug_conflict("help", None)
        .await
        .unwrap()
        .is_some());
    // Default tokens are not implied
    assert!(registry
        .check_slug_conflict("admin", None)
        .await
        .unwrap()
        .is_none());
}
