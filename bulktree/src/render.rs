//! Plain-text rendering of a built tree.
//!
//! Each node prints its separators (internal) or keys (leaf) padded with
//! `NA` up to the node's capacity tag, so every row of a level has a fixed
//! width regardless of fill.

use std::fmt::Display;

use crate::btree::{BPlusTree, Node, NodeId};

const PADDING: &str = "NA";

/// Render one node, e.g. `Internal[3, 5, NA, NA]` or `Leaf[1, 2, NA, NA]`.
#[must_use]
pub fn render_node<K: Display, V>(node: &Node<K, V>) -> String {
    let label = match node {
        Node::Internal(_) => "Internal",
        Node::Leaf(_) => "Leaf",
    };
    format!("{label}[{}]", padded_keys(node.keys(), node.capacity()))
}

/// Render the tree one depth per line, root first, nodes left to right.
///
/// A pass-through node sits one level higher than its siblings' children,
/// so its subtree is printed one line earlier than theirs.
#[must_use]
pub fn render_tree<K: Display, V>(tree: &BPlusTree<K, V>) -> String {
    let mut lines = Vec::new();
    let mut depth = vec![tree.root()];

    while !depth.is_empty() {
        let mut next = Vec::new();
        let mut row = Vec::with_capacity(depth.len());
        for id in depth {
            let Some(node) = tree.node(id) else {
                continue;
            };
            row.push(render_node(node));
            if let Node::Internal(internal) = node {
                next.extend(internal.children().iter().copied());
            }
        }
        lines.push(row.join("  "));
        depth = next;
    }

    lines.join("\n")
}

/// Render the leaves in chain order joined by `<->`.
#[must_use]
pub fn render_leaf_chain<K: Display, V>(tree: &BPlusTree<K, V>) -> String {
    tree.leaves()
        .map(|leaf| format!("[{}]", padded_keys(leaf.keys(), leaf.capacity())))
        .collect::<Vec<_>>()
        .join(" <-> ")
}

/// Describe a node's position in the arena, used by the binary's report.
#[must_use]
pub fn describe_node<K: Display, V>(tree: &BPlusTree<K, V>, id: NodeId) -> String {
    tree.node(id).map_or_else(
        || format!("{id}: missing"),
        |node| format!("{id}: {}", render_node(node)),
    )
}

fn padded_keys<K: Display>(keys: &[K], capacity: usize) -> String {
    let padding = capacity.saturating_sub(keys.len());
    keys.iter()
        .map(ToString::to_string)
        .chain(std::iter::repeat_n(PADDING.to_string(), padding))
        .collect::<Vec<_>>()
        .join(", ")
}
