//! Trash Cascade View
//!
//! Builds the annotated forest shown on trash-listing screens from the set
//! of currently trashed rows of one content table, and classifies each entry
//! as independently actionable or orphaned under a trashed ancestor.
//!
//! # Classification
//!
//! The forest is built from the *trashed set only*: a trashed row whose
//! parent is also in the trash nests under it; a trashed row whose parent is
//! absent from the set (still active, or no parent at all) becomes a root of
//! the trash forest.
//!
//! - Trash-forest roots are `restorable = true`: restore and permanent
//!   delete are permitted.
//! - Every descendant is `restorable = false`: acting on it while its parent
//!   sits in the trash would leave the hierarchy inconsistent (a live row
//!   under a trashed parent, or a permanently removed row still reachable
//!   from a recoverable one). Its controls are disabled until the parent is
//!   restored or deleted.
//!
//! This is a read-only view builder; the mutation-time re-check lives in
//! [`ContentService`](crate::services::ContentService).

use crate::models::Node;
use crate::services::tree::{build_forest, TreeNode};
use serde::Serialize;

/// One entry of the trash view.
#[derive(Debug, Clone, Serialize)]
pub struct TrashEntry {
    /// The trashed row
    #[serde(flatten)]
    pub node: Node,

    /// Trashed descendants nested under this entry
    pub children: Vec<TrashEntry>,

    /// Whether restore / permanent delete may be offered for this entry
    pub restorable: bool,

    /// Nesting level within the trash forest, for display indentation
    pub depth: usize,
}

/// Build the annotated trash forest from the full trashed set of one table.
///
/// # Examples
///
/// ```rust
/// use chrono::Utc;
/// use waypoint_core::models::Node;
/// use waypoint_core::services::build_trash_view;
///
/// let mut parent = Node::new_with_id("1", "Asia", "Asia", "asia", None);
/// let mut child = Node::new_with_id("2", "Nepal", "Nepal", "nepal", Some("1".into()));
/// parent.deleted_at = Some(Utc::now());
/// child.deleted_at = Some(Utc::now());
///
/// let view = build_trash_view(vec![child, parent]);
/// assert!(view[0].restorable);
/// assert!(!view[0].children[0].restorable);
/// ```
pub fn build_trash_view(trashed_nodes: Vec<Node>) -> Vec<TrashEntry> {
    build_forest(trashed_nodes)
        .into_iter()
        .map(|tree| annotate(tree, 0))
        .collect()
}

fn annotate(tree: TreeNode, depth: usize) -> TrashEntry {
    TrashEntry {
        node: tree.node,
        children: tree
            .children
            .into_iter()
            .map(|child| annotate(child, depth + 1))
            .collect(),
        restorable: depth == 0,
        depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn trashed(id: &str, parent: Option<&str>) -> Node {
        let mut node = Node::new_with_id(
            id,
            format!("Row {id}"),
            format!("Row {id}"),
            format!("row-{id}"),
            parent.map(String::from),
        );
        node.deleted_at = Some(Utc::now());
        node
    }

    #[test]
    fn test_trashed_parent_and_child() {
        // Child listed first: input order must not matter
        let view = build_trash_view(vec![trashed("2", Some("1")), trashed("1", None)]);

        assert_eq!(view.len(), 1);
        let root = &view[0];
        assert_eq!(root.node.id, "1");
        assert!(root.restorable);
        assert_eq!(root.depth, 0);

        let child = &root.children[0];
        assert_eq!(child.node.id, "2");
        assert!(!child.restorable);
        assert_eq!(child.depth, 1);
    }

    #[test]
    fn test_trashed_child_of_active_parent_is_restorable() {
        // Parent 9 is not in the trashed set (still active)
        let view = build_trash_view(vec![trashed("5", Some("9"))]);

        assert_eq!(view.len(), 1);
        assert_eq!(view[0].node.id, "5");
        assert!(view[0].restorable);
        assert_eq!(view[0].depth, 0);
    }

    #[test]
    fn test_three_level_trash_chain_depths() {
        let view = build_trash_view(vec![
            trashed("1", None),
            trashed("2", Some("1")),
            trashed("3", Some("2")),
        ]);

        let root = &view[0];
        let child = &root.children[0];
        let grandchild = &child.children[0];

        assert_eq!((root.depth, root.restorable), (0, true));
        assert_eq!((child.depth, child.restorable), (1, false));
        assert_eq!((grandchild.depth, grandchild.restorable), (2, false));
    }

    #[test]
    fn test_restorability_matches_trashed_ancestor_rule() {
        // Two independent subtrees plus one orphan
        let input = vec![
            trashed("a", None),
            trashed("a1", Some("a")),
            trashed("b", Some("active-parent")),
            trashed("c", None),
        ];

        let view = build_trash_view(input);

        let mut restorable_ids: Vec<&str> = view
            .iter()
            .filter(|e| e.restorable)
            .map(|e| e.node.id.as_str())
            .collect();
        restorable_ids.sort_unstable();

        assert_eq!(restorable_ids, ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_trash() {
        assert!(build_trash_view(Vec::new()).is_empty());
    }

    #[test]
    fn test_entry_serializes_with_flags() {
        let view = build_trash_view(vec![trashed("1", None)]);
        let json = serde_json::to_value(&view[0]).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["restorable"], true);
        assert_eq!(json["depth"], 0);
        assert!(json.get("deletedAt").is_some());
    }
}
