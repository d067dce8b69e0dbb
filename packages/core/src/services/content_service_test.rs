//! Tests for the Content Service
//!
//! Drives the slug-gated write path and the trash lifecycle against the
//! in-memory store, including the server-side restorability gate and bulk
//! best-effort semantics.

use crate::db::{ContentStore, MemoryStore};
use crate::models::{EntityTable, NodeDraft, NodeUpdate};
use crate::services::content_service::ContentService;
use crate::services::error::ContentServiceError;
use crate::services::slug::SYSTEM_ROUTE;
use std::sync::Arc;

async fn create_test_service() -> ContentService {
    ContentService::new(Arc::new(MemoryStore::new()))
}

#[tokio::test]
async fn test_create_derives_slug_from_url_title() {
    let service = create_test_service().await;

    let node = service
        .create(EntityTable::Places, NodeDraft::new("Everest Trek", "Everest Trek!"))
        .await
        .unwrap();

    assert_eq!(node.slug, "everest-trek");
    assert!(!node.is_trashed());
}

#[tokio::test]
async fn test_create_rejects_reserved_slug() {
    let service = create_test_service().await;

    let err = service
        .create(EntityTable::Places, NodeDraft::new("Admin", "Admin"))
        .await
        .unwrap_err();

    match err {
        ContentServiceError::SlugConflict { conflict } => {
            assert_eq!(conflict.source, SYSTEM_ROUTE);
        }
        other => panic!("Expected SlugConflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_rejects_cross_table_collision() {
    let service = create_test_service().await;

    service
        .create(
            EntityTable::Packages,
            NodeDraft::new("Everest Trek", "Everest Trek"),
        )
        .await
        .unwrap();

    let err = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Everest Trek", "Everest Trek"),
        )
        .await
        .unwrap_err();

    match err {
        ContentServiceError::SlugConflict { conflict } => {
            assert_eq!(conflict.source, "Package");
        }
        other => panic!("Expected SlugConflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slug_reuse_after_trash() {
    let service = create_test_service().await;

    let first = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Everest Trek", "Everest Trek"),
        )
        .await
        .unwrap();

    service.trash(EntityTable::Places, &first.id).await.unwrap();

    // The trashed owner no longer blocks the slug
    let second = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Everest Trek", "Everest Trek"),
        )
        .await
        .unwrap();
    assert_eq!(second.slug, "everest-trek");
}

#[tokio::test]
async fn test_update_keeps_own_slug_without_conflict() {
    let service = create_test_service().await;

    let node = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Everest Trek", "Everest Trek"),
        )
        .await
        .unwrap();

    // Editing the title only: the row keeps its own slug, no false positive
    let updated = service
        .update(
            EntityTable::Places,
            &node.id,
            NodeUpdate::new().with_title("Everest Base Camp Trek"),
        )
        .await
        .unwrap();

    assert_eq!(updated.title, "Everest Base Camp Trek");
    assert_eq!(updated.slug, "everest-trek");
}

#[tokio::test]
async fn test_update_rederives_slug_from_new_url_title() {
    let service = create_test_service().await;

    let node = service
        .create(EntityTable::Places, NodeDraft::new("Nepal", "Nepal"))
        .await
        .unwrap();

    let updated = service
        .update(
            EntityTable::Places,
            &node.id,
            NodeUpdate::new().with_url_title("Nepal Himalaya"),
        )
        .await
        .unwrap();

    assert_eq!(updated.slug, "nepal-himalaya");
}

#[tokio::test]
async fn test_update_rejects_collision_with_other_row() {
    let service = create_test_service().await;

    service
        .create(EntityTable::Places, NodeDraft::new("Nepal", "Nepal"))
        .await
        .unwrap();
    let tibet = service
        .create(EntityTable::Places, NodeDraft::new("Tibet", "Tibet"))
        .await
        .unwrap();

    let err = service
        .update(
            EntityTable::Places,
            &tibet.id,
            NodeUpdate::new().with_slug("nepal"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ContentServiceError::SlugConflict { .. }));
}

#[tokio::test]
async fn test_update_missing_row_is_not_found() {
    let service = create_test_service().await;

    let err = service
        .update(
            EntityTable::Places,
            "missing",
            NodeUpdate::new().with_title("X"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ContentServiceError::NotFound { .. }));
}

#[tokio::test]
async fn test_create_child_requires_existing_parent() {
    let service = create_test_service().await;

    let err = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Nepal", "Nepal").with_parent("missing"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ContentServiceError::InvalidParent { .. }));
}

#[tokio::test]
async fn test_parent_rejected_on_flat_table() {
    let service = create_test_service().await;

    let err = service
        .create(
            EntityTable::Blogs,
            NodeDraft::new("Post", "Post").with_parent("anything"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ContentServiceError::NotHierarchical { .. }));
}

#[tokio::test]
async fn test_update_rejects_self_parent() {
    let service = create_test_service().await;

    let node = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();

    let err = service
        .update(
            EntityTable::Places,
            &node.id,
            NodeUpdate::new().with_parent(node.id.clone()),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ContentServiceError::InvalidParent { .. }));
}

#[tokio::test]
async fn test_trash_does_not_cascade() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();
    let nepal = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Nepal", "Nepal").with_parent(asia.id.clone()),
        )
        .await
        .unwrap();

    service.trash(EntityTable::Places, &asia.id).await.unwrap();

    // Child stays live and is promoted to a root in the live forest
    let forest = service.list_forest(EntityTable::Places).await.unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].node.id, nepal.id);

    // Parent alone sits in the trash, independently actionable
    let trash = service.list_trash(EntityTable::Places).await.unwrap();
    assert_eq!(trash.len(), 1);
    assert_eq!(trash[0].node.id, asia.id);
    assert!(trash[0].restorable);
}

#[tokio::test]
async fn test_trash_view_nests_trashed_child() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();
    let nepal = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Nepal", "Nepal").with_parent(asia.id.clone()),
        )
        .await
        .unwrap();

    service.trash(EntityTable::Places, &nepal.id).await.unwrap();
    service.trash(EntityTable::Places, &asia.id).await.unwrap();

    let trash = service.list_trash(EntityTable::Places).await.unwrap();
    assert_eq!(trash.len(), 1);
    assert!(trash[0].restorable);
    assert_eq!(trash[0].children[0].node.id, nepal.id);
    assert!(!trash[0].children[0].restorable);
}

#[tokio::test]
async fn test_restore_refused_while_ancestor_trashed() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();
    let nepal = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Nepal", "Nepal").with_parent(asia.id.clone()),
        )
        .await
        .unwrap();

    service.trash(EntityTable::Places, &nepal.id).await.unwrap();
    service.trash(EntityTable::Places, &asia.id).await.unwrap();

    // The view disables the child; the mutation boundary enforces it too
    let err = service
        .restore(EntityTable::Places, &nepal.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ContentServiceError::AncestorInTrash { .. }));

    // Restoring the parent first unblocks the child
    service.restore(EntityTable::Places, &asia.id).await.unwrap();
    service.restore(EntityTable::Places, &nepal.id).await.unwrap();

    assert!(service.list_trash(EntityTable::Places).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_restore_orphan_of_active_parent_succeeds() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();
    let nepal = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Nepal", "Nepal").with_parent(asia.id.clone()),
        )
        .await
        .unwrap();

    service.trash(EntityTable::Places, &nepal.id).await.unwrap();

    // Parent is active, so the trashed child is independently restorable
    service.restore(EntityTable::Places, &nepal.id).await.unwrap();

    let forest = service.list_forest(EntityTable::Places).await.unwrap();
    assert_eq!(forest[0].children[0].node.id, nepal.id);
}

#[tokio::test]
async fn test_permanent_delete_requires_trash() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();

    let err = service
        .delete_permanently(EntityTable::Places, &asia.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ContentServiceError::NotTrashed { .. }));

    service.trash(EntityTable::Places, &asia.id).await.unwrap();
    service
        .delete_permanently(EntityTable::Places, &asia.id)
        .await
        .unwrap();

    let gone = service
        .store()
        .select_by_id(EntityTable::Places, &asia.id)
        .await
        .unwrap();
    assert!(gone.is_none());
}

#[tokio::test]
async fn test_permanent_delete_refused_while_ancestor_trashed() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();
    let nepal = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Nepal", "Nepal").with_parent(asia.id.clone()),
        )
        .await
        .unwrap();

    service.trash(EntityTable::Places, &nepal.id).await.unwrap();
    service.trash(EntityTable::Places, &asia.id).await.unwrap();

    let err = service
        .delete_permanently(EntityTable::Places, &nepal.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ContentServiceError::AncestorInTrash { .. }));
}

#[tokio::test]
async fn test_bulk_restore_is_best_effort() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();
    let nepal = service
        .create(
            EntityTable::Places,
            NodeDraft::new("Nepal", "Nepal").with_parent(asia.id.clone()),
        )
        .await
        .unwrap();
    let europe = service
        .create(EntityTable::Places, NodeDraft::new("Europe", "Europe"))
        .await
        .unwrap();

    service.trash(EntityTable::Places, &nepal.id).await.unwrap();
    service.trash(EntityTable::Places, &asia.id).await.unwrap();
    service.trash(EntityTable::Places, &europe.id).await.unwrap();

    // nepal is blocked by its trashed parent; the batch continues past it
    let ids = vec![nepal.id.clone(), europe.id.clone(), "missing".to_string()];
    let outcome = service
        .restore_many(EntityTable::Places, &ids)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, vec![europe.id.clone()]);
    assert_eq!(outcome.skipped.len(), 2);
    assert_eq!(outcome.skipped[0].id, nepal.id);
    assert_eq!(outcome.skipped[1].id, "missing");
}

#[tokio::test]
async fn test_bulk_permanent_delete_reports_outcomes() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();
    let europe = service
        .create(EntityTable::Places, NodeDraft::new("Europe", "Europe"))
        .await
        .unwrap();

    service.trash(EntityTable::Places, &europe.id).await.unwrap();

    // asia is still live and must be refused; europe purges
    let ids = vec![asia.id.clone(), europe.id.clone()];
    let outcome = service
        .delete_many_permanently(EntityTable::Places, &ids)
        .await
        .unwrap();

    assert_eq!(outcome.succeeded, vec![europe.id.clone()]);
    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.skipped[0].id, asia.id);
}

#[tokio::test]
async fn test_menu_slug_skips_namespace_check() {
    let service = create_test_service().await;

    service
        .create(EntityTable::Places, NodeDraft::new("Nepal", "Nepal"))
        .await
        .unwrap();

    // Menus are not in the slug namespace: the place's slug does not block
    let menu = service
        .create(EntityTable::Menus, NodeDraft::new("Nepal", "Nepal"))
        .await
        .unwrap();
    assert_eq!(menu.slug, "nepal");
}

#[tokio::test]
async fn test_trash_and_restore_are_idempotent() {
    let service = create_test_service().await;

    let asia = service
        .create(EntityTable::Places, NodeDraft::new("Asia", "Asia"))
        .await
        .unwrap();

    service.trash(EntityTable::Places, &asia.id).await.unwrap();
    service.trash(EntityTable::Places, &asia.id).await.unwrap();

    service.restore(EntityTable::Places, &asia.id).await.unwrap();
    service.restore(EntityTable::Places, &asia.id).await.unwrap();

    assert!(service.list_trash(EntityTable::Places).await.unwrap().is_empty());
}
