//! Structural invariant checks for built trees.
//!
//! A tree is never re-validated after build, so these checks exist for tests
//! and for the binary's post-build report. Each check records what it found
//! instead of stopping at the first problem.

use crate::btree::{BPlusTree, LeafNode, Node, NodeId};

/// An invariant violation found in a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violation.
    pub description: String,
    /// Node where it was detected, if any.
    pub node: Option<NodeId>,
    /// Additional context.
    pub context: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.node {
            Some(node) => write!(f, "{} at node {node}", self.description)?,
            None => write!(f, "{}", self.description)?,
        }
        if !self.context.is_empty() {
            write!(f, " ({})", self.context)?;
        }
        Ok(())
    }
}

/// Checker for tree invariants.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    /// Detected violations.
    violations: Vec<InvariantViolation>,
}

impl InvariantChecker {
    /// Create a new invariant checker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Get all violations.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    /// Check if any violations were detected.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty() is not const-stable
    pub fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Clear all recorded violations.
    pub fn clear(&mut self) {
        self.violations.clear();
    }

    fn add(&mut self, description: &str, node: Option<NodeId>, context: String) {
        self.violations.push(InvariantViolation {
            description: description.to_string(),
            node,
            context,
        });
    }

    /// Run every check on `tree`.
    pub fn check_tree<K: Ord + std::fmt::Debug, V>(&mut self, tree: &BPlusTree<K, V>) {
        self.check_leaf_chain(tree);
        self.check_chain_matches_tree(tree);
        self.check_separators(tree);
        self.check_separator_order(tree);
        self.check_leaf_fill(tree);
    }

    /// Keys read along `next` links never decrease, and every `next` link is
    /// mirrored by a `prev` link.
    pub fn check_leaf_chain<K: Ord + std::fmt::Debug, V>(&mut self, tree: &BPlusTree<K, V>) {
        let mut previous_key: Option<&K> = None;
        let mut previous_leaf: Option<NodeId> = None;
        let mut current = Some(tree.first_leaf());

        while let Some(id) = current {
            let Some(leaf) = tree.leaf(id) else {
                self.add("Leaf chain points at a non-leaf", Some(id), String::new());
                return;
            };
            if leaf.prev_leaf() != previous_leaf {
                self.add(
                    "Leaf prev link does not match chain",
                    Some(id),
                    format!("prev {:?}, expected {previous_leaf:?}", leaf.prev_leaf()),
                );
            }
            for key in leaf.keys() {
                if previous_key.is_some_and(|previous| previous > key) {
                    self.add(
                        "Leaf chain keys out of order",
                        Some(id),
                        format!("{previous_key:?} before {key:?}"),
                    );
                }
                previous_key = Some(key);
            }
            previous_leaf = Some(id);
            current = leaf.next_leaf();
        }

        if previous_leaf != Some(tree.last_leaf()) {
            self.add(
                "Leaf chain does not end at the last leaf",
                previous_leaf,
                format!("last leaf is {}", tree.last_leaf()),
            );
        }
    }

    /// The leaves reached by descending from the root, left to right, are
    /// exactly the leaves of the chain, and they hold `tree.len()` entries.
    pub fn check_chain_matches_tree<K, V>(&mut self, tree: &BPlusTree<K, V>) {
        let mut reachable = Vec::new();
        collect_leaves(tree, tree.root(), &mut reachable);

        let mut chained = Vec::new();
        let mut current = Some(tree.first_leaf());
        while let Some(id) = current {
            let Some(leaf) = tree.leaf(id) else {
                break;
            };
            chained.push(id);
            current = leaf.next_leaf();
        }

        if reachable != chained {
            self.add(
                "Leaves under the root differ from the leaf chain",
                None,
                format!("{} reachable, {} chained", reachable.len(), chained.len()),
            );
        }

        let entries: usize = chained
            .iter()
            .filter_map(|id| tree.leaf(*id))
            .map(LeafNode::len)
            .sum();
        if entries != tree.len() {
            self.add(
                "Leaf entry count differs from tree length",
                None,
                format!("{entries} in leaves, len {}", tree.len()),
            );
        }
    }

    /// Every internal node has one separator fewer than children, separator
    /// `i` is the smallest key under `children[i + 1]`, and the recorded
    /// minimum is the smallest key under the node.
    pub fn check_separators<K: Ord + std::fmt::Debug, V>(&mut self, tree: &BPlusTree<K, V>) {
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            let Some(Node::Internal(node)) = tree.node(id) else {
                continue;
            };

            if node.separators().len() + 1 != node.children().len() {
                self.add(
                    "Separator count does not match children",
                    Some(id),
                    format!(
                        "{} separators, {} children",
                        node.separators().len(),
                        node.children().len()
                    ),
                );
            }

            if subtree_min(tree, id) != Some(node.min_key()) {
                self.add(
                    "Recorded minimum is not the subtree minimum",
                    Some(id),
                    format!("recorded {:?}", node.min_key()),
                );
            }

            for (i, separator) in node.separators().iter().enumerate() {
                let Some(&child) = node.children().get(i + 1) else {
                    break;
                };
                let actual = subtree_min(tree, child);
                if actual != Some(separator) {
                    self.add(
                        "Separator is not the minimum of its child",
                        Some(id),
                        format!("separator {i} is {separator:?}, child minimum {actual:?}"),
                    );
                }
            }

            stack.extend(node.children().iter().copied());
        }
    }

    /// Separators never decrease within a node.
    ///
    /// They are strictly ascending only when keys are distinct; copies of a
    /// key that start several children repeat as equal separators.
    pub fn check_separator_order<K: Ord + std::fmt::Debug, V>(&mut self, tree: &BPlusTree<K, V>) {
        let mut stack = vec![tree.root()];
        while let Some(id) = stack.pop() {
            let Some(Node::Internal(node)) = tree.node(id) else {
                continue;
            };
            for (i, pair) in node.separators().windows(2).enumerate() {
                if pair[0] > pair[1] {
                    self.add(
                        "Separators out of order",
                        Some(id),
                        format!("separator {i} is {:?}, next is {:?}", pair[0], pair[1]),
                    );
                }
            }
            stack.extend(node.children().iter().copied());
        }
    }

    /// Every leaf holds at most `max_per_bucket` entries, and every leaf but
    /// the last holds exactly that many.
    pub fn check_leaf_fill<K, V>(&mut self, tree: &BPlusTree<K, V>) {
        let expected = tree.max_per_bucket();
        let last = tree.last_leaf();

        let mut current = Some(tree.first_leaf());
        while let Some(id) = current {
            let Some(leaf) = tree.leaf(id) else {
                return;
            };
            let overfilled = leaf.len() > expected;
            let underfilled = id != last && leaf.len() != expected;
            if overfilled || underfilled {
                self.add(
                    "Leaf fill differs from bucket size",
                    Some(id),
                    format!("{} entries, bucket size {expected}", leaf.len()),
                );
            }
            current = leaf.next_leaf();
        }
    }
}

/// Push the leaves under `id` in left-to-right order.
fn collect_leaves<K, V>(tree: &BPlusTree<K, V>, id: NodeId, out: &mut Vec<NodeId>) {
    match tree.node(id) {
        Some(Node::Leaf(_)) => out.push(id),
        Some(Node::Internal(node)) => {
            for &child in node.children() {
                collect_leaves(tree, child, out);
            }
        }
        None => {}
    }
}

/// Smallest key in any leaf under `id`, found by visiting every leaf.
fn subtree_min<K: Ord, V>(tree: &BPlusTree<K, V>, id: NodeId) -> Option<&K> {
    match tree.node(id)? {
        Node::Leaf(leaf) => leaf.keys().iter().min(),
        Node::Internal(node) => node
            .children()
            .iter()
            .filter_map(|&child| subtree_min(tree, child))
            .min(),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::btree::{RemainderPolicy, RoutingRule};
    use crate::config::BuildConfig;
    use crate::testing::{random_parameters, seeded_records, sequential_records};

    fn violations<K: Ord + std::fmt::Debug, V>(tree: &BPlusTree<K, V>) -> Vec<InvariantViolation> {
        let mut checker = InvariantChecker::new();
        checker.check_tree(tree);
        checker.violations().to_vec()
    }

    #[test]
    fn test_well_formed_trees_pass() {
        for (order, load) in [(1, 0.5), (1, 1.0), (2, 0.66), (2, 1.0), (5, 0.3)] {
            for count in [0, 1, 2, 7, 64, 333] {
                for remainder in [RemainderPolicy::Flush, RemainderPolicy::Discard] {
                    let config = BuildConfig::new(order, load).with_remainder(remainder);
                    let tree = BPlusTree::build(seeded_records(count as u64, count), &config)
                        .expect("build");
                    let found = violations(&tree);
                    assert!(
                        found.is_empty(),
                        "order {order} load {load} count {count} {remainder:?}: {found:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_random_parameters_pass() {
        let mut rng = StdRng::seed_from_u64(2024);
        for seed in 0..40 {
            let (order, load) = random_parameters(&mut rng);
            let config = BuildConfig::new(order, load).with_routing(RoutingRule::LastMatch);
            let records = seeded_records(seed, 150);
            let tree = BPlusTree::build(records.iter().copied(), &config).expect("build");

            assert!(violations(&tree).is_empty(), "seed {seed}");
            for (key, value) in &records {
                assert_eq!(tree.get(key), Ok(value), "seed {seed} key {key}");
            }
        }
    }

    #[test]
    fn test_detects_bad_separator() {
        let mut tree = BPlusTree::build(sequential_records(8), &BuildConfig::new(1, 0.5))
            .expect("build");
        let root = tree.root();
        if let Some(Node::Internal(node)) = tree.node_mut(root) {
            node.separators[0] += 1;
        }

        let found = violations(&tree);
        assert!(
            found
                .iter()
                .any(|v| v.description == "Separator is not the minimum of its child"),
            "{found:?}"
        );
    }

    #[test]
    fn test_detects_descending_separators() {
        // Three leaves of two under one root with separators [2, 4].
        let mut tree = BPlusTree::build(sequential_records(6), &BuildConfig::new(1, 1.0))
            .expect("build");
        let root = tree.root();
        if let Some(Node::Internal(node)) = tree.node_mut(root) {
            node.separators.swap(0, 1);
        }

        let found = violations(&tree);
        assert!(
            found
                .iter()
                .any(|v| v.description == "Separators out of order" && v.node == Some(root)),
            "{found:?}"
        );
    }

    #[test]
    fn test_repeated_keys_pass() {
        let records: Vec<(u32, u32)> = (0..40).map(|i| (i / 7, i)).collect();
        for (order, load) in [(1, 0.5), (1, 1.0), (2, 0.75)] {
            let tree = BPlusTree::build(records.iter().copied(), &BuildConfig::new(order, load))
                .expect("build");
            let found = violations(&tree);
            assert!(found.is_empty(), "order {order} load {load}: {found:?}");
        }
    }

    #[test]
    fn test_detects_broken_chain() {
        let mut tree = BPlusTree::build(sequential_records(8), &BuildConfig::new(1, 1.0))
            .expect("build");
        let first = tree.first_leaf();
        if let Some(Node::Leaf(leaf)) = tree.node_mut(first) {
            leaf.next_leaf = None;
        }

        let found = violations(&tree);
        assert!(found
            .iter()
            .any(|v| v.description == "Leaves under the root differ from the leaf chain"));
        assert!(found
            .iter()
            .any(|v| v.description == "Leaf chain does not end at the last leaf"));
    }

    #[test]
    fn test_violation_display() {
        let violation = InvariantViolation {
            description: "Leaf fill differs from bucket size".to_string(),
            node: Some(NodeId(4)),
            context: "1 entries, bucket size 2".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "Leaf fill differs from bucket size at node #4 (1 entries, bucket size 2)"
        );

        let mut checker = InvariantChecker::new();
        assert!(!checker.has_violations());
        checker.add("Something", None, String::new());
        assert!(checker.has_violations());
        assert_eq!(checker.violations()[0].to_string(), "Something");
        checker.clear();
        assert!(!checker.has_violations());
    }
}
