//! Static B+tree built in one pass from a known set of records.
//!
//! The tree is bulk loaded by [`BPlusTree::build`] and never changes
//! afterwards. Lookups descend from the root using each internal node's
//! separators, then scan the reached leaf for an exact match.

use crate::btree::level::build_levels;
use crate::btree::node::{LeafNode, Node, NodeId, RoutingRule};
use crate::btree::partition::partition_leaves;
use crate::config::BuildConfig;

/// An immutable B+tree index.
#[derive(Debug, Clone, PartialEq)]
pub struct BPlusTree<K, V> {
    /// Every node of the tree. Parents are pushed after their children.
    nodes: Vec<Node<K, V>>,
    root: NodeId,
    first_leaf: NodeId,
    last_leaf: NodeId,
    order: usize,
    load: f64,
    max_per_bucket: usize,
    routing: RoutingRule,
    len: usize,
    discarded: usize,
}

impl<K, V> BPlusTree<K, V>
where
    K: Ord + Clone,
{
    /// Bulk load a tree from `records` in any order.
    ///
    /// Records are stable-sorted by key, so duplicate keys keep their input
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidParameter`] if `config.order` is zero,
    /// `config.load` is outside `(0, 1]`, or the two leave no room for a
    /// single record per leaf. Nothing is built in that case.
    pub fn build<I>(records: I, config: &BuildConfig) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let max_per_bucket = config.max_per_bucket()?;
        let capacity = config.capacity();

        let mut sorted: Vec<(K, V)> = records.into_iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        let record_count = sorted.len();

        tracing::debug!(
            records = record_count,
            order = config.order,
            load = config.load,
            max_per_bucket,
            "bulk loading tree"
        );

        let mut nodes = Vec::new();
        let partition =
            partition_leaves(sorted, max_per_bucket, capacity, config.remainder, &mut nodes);
        if partition.discarded > 0 {
            tracing::warn!(
                discarded = partition.discarded,
                "trailing records did not fill a leaf and were dropped"
            );
        }

        let leaf_count = partition.leaves.len();
        let first_leaf = partition.leaves.first().map(|entry| entry.id);
        let last_leaf = partition.leaves.last().map(|entry| entry.id);
        let fan_out = max_per_bucket.saturating_add(1);
        let root = build_levels(partition.leaves, fan_out, capacity, &mut nodes).map(|entry| entry.id);

        let (root, first_leaf, last_leaf) = match (root, first_leaf, last_leaf) {
            (Some(root), Some(first), Some(last)) => (root, first, last),
            _ => {
                // Nothing was sealed: the root is a single empty leaf.
                let id = NodeId(nodes.len());
                nodes.push(Node::Leaf(LeafNode::new(
                    Vec::new(),
                    Vec::new(),
                    None,
                    capacity,
                )));
                (id, id, id)
            }
        };

        let tree = Self {
            nodes,
            root,
            first_leaf,
            last_leaf,
            order: config.order,
            load: config.load,
            max_per_bucket,
            routing: config.routing,
            len: record_count - partition.discarded,
            discarded: partition.discarded,
        };

        tracing::info!(
            entries = tree.len,
            leaves = leaf_count,
            nodes = tree.nodes.len(),
            height = tree.height(),
            "built tree"
        );

        Ok(tree)
    }

    /// Look up a value by key using the tree's configured routing rule.
    ///
    /// For a duplicated key this is the first copy stored in the leaf the
    /// routing rule reaches. When copies span several leaves, separators
    /// equal to the key send the search to a later leaf, so earlier copies
    /// are only reachable through the leaf chain.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::KeyNotFound`] if the reached leaf holds no
    /// equal key, or [`LookupError::RoutingExhausted`] if an internal node
    /// could not pick a child.
    pub fn get(&self, key: &K) -> Result<&V, LookupError> {
        self.get_with(key, self.routing)
    }

    /// Look up a value by key using an explicit routing rule.
    ///
    /// # Errors
    ///
    /// Same as [`BPlusTree::get`].
    pub fn get_with(&self, key: &K, rule: RoutingRule) -> Result<&V, LookupError> {
        let leaf_id = self.find_leaf(key, rule)?;
        self.leaf(leaf_id)
            .and_then(|leaf| leaf.get(key))
            .ok_or(LookupError::KeyNotFound)
    }

    /// Find the leaf that the routing rule sends `key` to.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::RoutingExhausted`] if an internal node could
    /// not pick a child.
    pub fn find_leaf(&self, key: &K, rule: RoutingRule) -> Result<NodeId, LookupError> {
        let mut current = self.root;

        loop {
            match &self.nodes[current.0] {
                Node::Leaf(_) => return Ok(current),
                Node::Internal(node) => {
                    let Some(child_idx) = node.find_child_index(key, rule) else {
                        tracing::error!(node = %current, "no child qualifies for search key");
                        return Err(LookupError::RoutingExhausted { node: current });
                    };
                    current = node.children()[child_idx];
                }
            }
        }
    }
}

impl<K, V> BPlusTree<K, V> {
    /// Get the root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Get a node by ID.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node<K, V>> {
        self.nodes.get(id.0)
    }

    /// Mutable node access for tests that corrupt a tree on purpose.
    #[cfg(test)]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(id.0)
    }

    /// Get a leaf by ID, `None` if the ID names an internal node.
    #[must_use]
    pub fn leaf(&self, id: NodeId) -> Option<&LeafNode<K, V>> {
        self.node(id).and_then(Node::as_leaf)
    }

    /// Leftmost leaf of the chain.
    #[must_use]
    pub const fn first_leaf(&self) -> NodeId {
        self.first_leaf
    }

    /// Rightmost leaf of the chain.
    #[must_use]
    pub const fn last_leaf(&self) -> NodeId {
        self.last_leaf
    }

    #[must_use]
    pub const fn order(&self) -> usize {
        self.order
    }

    #[must_use]
    pub const fn load(&self) -> f64 {
        self.load
    }

    /// Node capacity tag (`2 * order`), kept for display.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.order.saturating_mul(2)
    }

    /// Records sealed into each full leaf.
    #[must_use]
    pub const fn max_per_bucket(&self) -> usize {
        self.max_per_bucket
    }

    #[must_use]
    pub const fn routing(&self) -> RoutingRule {
        self.routing
    }

    /// Number of entries stored in the leaves.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of input records dropped by [`RemainderPolicy::Discard`].
    ///
    /// [`RemainderPolicy::Discard`]: crate::btree::RemainderPolicy::Discard
    #[must_use]
    pub const fn discarded(&self) -> usize {
        self.discarded
    }

    /// Number of nodes in the tree, leaves included.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len() is not const-stable
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of levels on the leftmost root-to-leaf path.
    ///
    /// A tree whose root is a leaf has height 1. Pass-through nodes can make
    /// other paths shorter.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 1;
        let mut current = self.root;
        while let Some(Node::Internal(node)) = self.nodes.get(current.0) {
            let Some(&first) = node.children().first() else {
                break;
            };
            current = first;
            height += 1;
        }
        height
    }

    /// Walk the leaf chain from the leftmost leaf following `next` links.
    #[must_use]
    pub const fn leaves(&self) -> Leaves<'_, K, V> {
        Leaves {
            tree: self,
            current: Some(self.first_leaf),
            forward: true,
        }
    }

    /// Walk the leaf chain from the rightmost leaf following `prev` links.
    #[must_use]
    pub const fn leaves_rev(&self) -> Leaves<'_, K, V> {
        Leaves {
            tree: self,
            current: Some(self.last_leaf),
            forward: false,
        }
    }

    /// Iterate over all entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.leaves().flat_map(|leaf| leaf.entries())
    }
}

/// Iterator over the leaf chain.
pub struct Leaves<'a, K, V> {
    tree: &'a BPlusTree<K, V>,
    current: Option<NodeId>,
    forward: bool,
}

impl<'a, K, V> Iterator for Leaves<'a, K, V> {
    type Item = &'a LeafNode<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let leaf = self.tree.leaf(self.current?)?;
        self.current = if self.forward {
            leaf.next_leaf()
        } else {
            leaf.prev_leaf()
        };
        Some(leaf)
    }
}

/// Errors that can occur while building a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A build parameter is out of range.
    InvalidParameter { name: &'static str, message: String },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidParameter { name, message } => {
                write!(f, "invalid parameter {name}: {message}")
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Errors that can occur during a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupError {
    /// No entry in the reached leaf matches the key.
    KeyNotFound,
    /// An internal node had no child to descend into.
    RoutingExhausted { node: NodeId },
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KeyNotFound => write!(f, "key not found"),
            Self::RoutingExhausted { node } => {
                write!(f, "routing exhausted at internal node {node}")
            }
        }
    }
}

impl std::error::Error for LookupError {}
