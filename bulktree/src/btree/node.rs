//! B+tree node types.
//!
//! Nodes live in an arena owned by the tree and refer to each other through
//! [`NodeId`] handles:
//! - Internal nodes: store separator keys and child handles
//! - Leaf nodes: store key-value pairs, doubly-linked in ascending key order
//!
//! The parent -> child edges are the only ownership edges. The leaf
//! `prev_leaf`/`next_leaf` links are navigation handles and never keep a
//! node alive on their own.

/// Handle to a node inside the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Position of the node inside the arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which shape a node has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Internal,
    Leaf,
}

/// How an internal node picks a child for a search key.
///
/// Both rules send keys below the first separator to `children[0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoutingRule {
    /// Descend into `children[j + 1]` for the first `j` with
    /// `key >= separators[j]`.
    ///
    /// Once the key clears the first separator this always picks
    /// `children[1]`, so keys living under `children[2..]` are not reachable.
    /// Trees whose internal nodes have at most two children route correctly.
    #[default]
    FirstMatch,
    /// Descend into `children[j + 1]` for the last `j` with
    /// `key >= separators[j]`.
    LastMatch,
}

impl RoutingRule {
    /// Parse the names used in configuration (`first-match`, `last-match`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first-match" => Some(Self::FirstMatch),
            "last-match" => Some(Self::LastMatch),
            _ => None,
        }
    }
}

/// A node in the tree: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<K, V> {
    Internal(InternalNode<K>),
    Leaf(LeafNode<K, V>),
}

impl<K, V> Node<K, V> {
    #[must_use]
    pub const fn node_type(&self) -> NodeType {
        match self {
            Self::Internal(_) => NodeType::Internal,
            Self::Leaf(_) => NodeType::Leaf,
        }
    }

    /// Display capacity (`2 * order`). Never used for routing.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        match self {
            Self::Internal(node) => node.capacity,
            Self::Leaf(leaf) => leaf.capacity,
        }
    }

    /// The key row shown for this node: separators or leaf keys.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        match self {
            Self::Internal(node) => &node.separators,
            Self::Leaf(leaf) => &leaf.keys,
        }
    }

    /// Smallest key stored under this node, `None` for an empty leaf.
    #[must_use]
    pub fn min_key(&self) -> Option<&K> {
        match self {
            Self::Internal(node) => Some(&node.min_key),
            Self::Leaf(leaf) => leaf.keys.first(),
        }
    }

    #[must_use]
    pub const fn as_internal(&self) -> Option<&InternalNode<K>> {
        match self {
            Self::Internal(node) => Some(node),
            Self::Leaf(_) => None,
        }
    }

    #[must_use]
    pub const fn as_leaf(&self) -> Option<&LeafNode<K, V>> {
        match self {
            Self::Internal(_) => None,
            Self::Leaf(leaf) => Some(leaf),
        }
    }

    pub(crate) const fn as_leaf_mut(&mut self) -> Option<&mut LeafNode<K, V>> {
        match self {
            Self::Internal(_) => None,
            Self::Leaf(leaf) => Some(leaf),
        }
    }
}

/// An internal (non-leaf) node.
///
/// Stores N separators and N+1 children.
/// `separators[i]` is the smallest key under `children[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode<K> {
    pub(crate) children: Vec<NodeId>,
    pub(crate) separators: Vec<K>,
    /// Smallest key under `children[0]`, recorded when the node is created.
    pub(crate) min_key: K,
    pub(crate) capacity: usize,
}

impl<K: Ord> InternalNode<K> {
    /// Create an internal node.
    ///
    /// `separators[i]` must be the smallest key under `children[i + 1]` and
    /// `min_key` the smallest key under `children[0]`.
    pub(crate) fn new(
        children: Vec<NodeId>,
        separators: Vec<K>,
        min_key: K,
        capacity: usize,
    ) -> Self {
        debug_assert!(children.len() >= 2);
        debug_assert_eq!(children.len(), separators.len() + 1);
        Self {
            children,
            separators,
            min_key,
            capacity,
        }
    }

    /// Find the child index for a given key.
    ///
    /// Returns `None` when no child qualifies, which only happens if the
    /// node has no separators.
    #[must_use]
    pub fn find_child_index(&self, key: &K, rule: RoutingRule) -> Option<usize> {
        let first = self.separators.first()?;
        if key < first {
            return Some(0);
        }
        match rule {
            RoutingRule::FirstMatch => self
                .separators
                .iter()
                .position(|separator| key >= separator)
                .map(|j| j + 1),
            // Number of separators <= key; at least one since key >= first.
            RoutingRule::LastMatch => {
                Some(self.separators.partition_point(|separator| separator <= key))
            }
        }
    }
}

impl<K> InternalNode<K> {
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[must_use]
    pub fn separators(&self) -> &[K] {
        &self.separators
    }

    #[must_use]
    pub const fn min_key(&self) -> &K {
        &self.min_key
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A leaf node.
///
/// Stores index-aligned keys and values and links to sibling leaves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<V>,
    pub(crate) prev_leaf: Option<NodeId>,
    pub(crate) next_leaf: Option<NodeId>,
    pub(crate) capacity: usize,
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new(
        keys: Vec<K>,
        values: Vec<V>,
        prev_leaf: Option<NodeId>,
        capacity: usize,
    ) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self {
            keys,
            values,
            prev_leaf,
            next_leaf: None,
            capacity,
        }
    }

    pub(crate) const fn set_next_leaf(&mut self, next: NodeId) {
        self.next_leaf = Some(next);
    }

    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    #[must_use]
    pub const fn prev_leaf(&self) -> Option<NodeId> {
        self.prev_leaf
    }

    #[must_use]
    pub const fn next_leaf(&self) -> Option<NodeId> {
        self.next_leaf
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len() is not const-stable
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty() is not const-stable
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Iterate over the leaf's entries in key order.
    pub fn entries(&self) -> impl Iterator<Item = (&K, &V)> {
        self.keys.iter().zip(self.values.iter())
    }
}

impl<K: PartialEq, V> LeafNode<K, V> {
    /// Get the value paired with the first key equal to `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| &self.values[i])
    }
}
