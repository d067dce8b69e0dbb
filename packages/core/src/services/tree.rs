//! Forest Construction
//!
//! Converts a flat list of rows belonging to one content table into a nested
//! forest using parent-pointer linking. The caller chooses the input set
//! (live rows for listings, trashed rows for the trash view); this module
//! never touches storage.
//!
//! # Algorithm
//!
//! Arena-and-index, two passes:
//!
//! 1. Build an id → position index over the input.
//! 2. For each row, link it under its parent when the parent is *in the
//!    input set*; otherwise promote it to a root.
//!
//! A row whose parent is missing from the input (filtered out, trashed, or
//! never existed) silently becomes a root - that is the leniency policy, not
//! an error. Sibling order preserves input order; no sorting is imposed.
//!
//! The assembly consumes each row exactly once, so malformed inputs
//! (self-referencing rows, parent cycles) can never cause unbounded
//! recursion: cycle members surface as extra roots instead of disappearing.

use crate::models::Node;
use serde::Serialize;
use std::collections::HashMap;

/// One node of a built forest: the row plus its nested children.
///
/// Serializes to the flattened `{..row fields, children: [...]}` shape the
/// selection widgets and listing pages consume.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    /// The content row
    #[serde(flatten)]
    pub node: Node,

    /// Child subtrees, in input order
    pub children: Vec<TreeNode>,
}

/// Build a forest from a flat list of rows of one content table.
///
/// Total over any input: every row of the input appears exactly once in the
/// result, either nested under its located parent or as a root.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::models::Node;
/// use waypoint_core::services::build_forest;
///
/// let asia = Node::new_with_id("1", "Asia", "Asia", "asia", None);
/// let nepal = Node::new_with_id("2", "Nepal", "Nepal", "nepal", Some("1".into()));
///
/// let forest = build_forest(vec![asia, nepal]);
/// assert_eq!(forest.len(), 1);
/// assert_eq!(forest[0].children[0].node.title, "Nepal");
/// ```
pub fn build_forest(nodes: Vec<Node>) -> Vec<TreeNode> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut children_of: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut roots: Vec<usize> = Vec::new();

    for (i, node) in nodes.iter().enumerate() {
        match node
            .parent_id
            .as_deref()
            .and_then(|p| index.get(p))
            .copied()
        {
            // Parent present in the input set: nest under it.
            // A row naming itself as parent falls through to the root list.
            Some(parent) if parent != i => children_of[parent].push(i),
            _ => roots.push(i),
        }
    }

    // The index borrows ids from `nodes`; release it before taking ownership
    drop(index);
    let mut slots: Vec<Option<Node>> = nodes.into_iter().map(Some).collect();

    let mut forest: Vec<TreeNode> = roots
        .into_iter()
        .filter_map(|r| assemble(r, &children_of, &mut slots))
        .collect();

    // Rows trapped in a parent cycle are reachable from no root; surface
    // them as extra roots so the output stays a permutation of the input.
    for i in 0..slots.len() {
        if slots[i].is_some() {
            if let Some(extra) = assemble(i, &children_of, &mut slots) {
                forest.push(extra);
            }
        }
    }

    forest
}

/// Recursively assemble the subtree rooted at `i`, consuming row slots.
///
/// A slot already taken (cycle back-edge) terminates that branch, so the
/// recursion is bounded by the input length.
fn assemble(i: usize, children_of: &[Vec<usize>], slots: &mut [Option<Node>]) -> Option<TreeNode> {
    let node = slots[i].take()?;

    let children = children_of[i]
        .iter()
        .filter_map(|&c| assemble(c, children_of, slots))
        .collect();

    Some(TreeNode { node, children })
}

/// Flatten a forest back to a row list, pre-order (each parent before its
/// children).
pub fn flatten_forest(forest: &[TreeNode]) -> Vec<&Node> {
    let mut out = Vec::new();
    let mut stack: Vec<&TreeNode> = forest.iter().rev().collect();

    while let Some(tree) = stack.pop() {
        out.push(&tree.node);
        for child in tree.children.iter().rev() {
            stack.push(child);
        }
    }

    out
}
