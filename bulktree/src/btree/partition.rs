//! Leaf partitioning: slices sorted records into fixed-size leaves.

use crate::btree::level::LevelEntry;
use crate::btree::node::{LeafNode, Node, NodeId};

/// What to do with records left over after the last full bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainderPolicy {
    /// Seal the leftover records into a final, possibly undersized leaf.
    #[default]
    Flush,
    /// Drop the leftover records. They are not reachable from the tree.
    Discard,
}

impl RemainderPolicy {
    /// Parse the names used in configuration (`flush`, `discard`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "flush" => Some(Self::Flush),
            "discard" => Some(Self::Discard),
            _ => None,
        }
    }
}

/// Output of [`partition_leaves`].
#[derive(Debug)]
pub(crate) struct Partition<K> {
    /// Sealed leaves in ascending key order.
    pub leaves: Vec<LevelEntry<K>>,
    /// Records dropped under [`RemainderPolicy::Discard`].
    pub discarded: usize,
}

/// Seal `sorted` into leaves of `max_per_bucket` records each.
///
/// Leaves are appended to `arena` and linked to their neighbours as they
/// are sealed. `capacity` is only recorded on each leaf.
pub(crate) fn partition_leaves<K, V>(
    sorted: Vec<(K, V)>,
    max_per_bucket: usize,
    capacity: usize,
    policy: RemainderPolicy,
    arena: &mut Vec<Node<K, V>>,
) -> Partition<K>
where
    K: Clone,
{
    debug_assert!(max_per_bucket >= 1);

    // A bucket never holds more than the whole input.
    let bucket_len = max_per_bucket.min(sorted.len());
    let mut leaves: Vec<LevelEntry<K>> = Vec::with_capacity(sorted.len() / max_per_bucket + 1);
    let mut key_bucket = Vec::with_capacity(bucket_len);
    let mut value_bucket = Vec::with_capacity(bucket_len);

    for (key, value) in sorted {
        key_bucket.push(key);
        value_bucket.push(value);
        if key_bucket.len() >= max_per_bucket {
            let keys = std::mem::replace(&mut key_bucket, Vec::with_capacity(bucket_len));
            let values = std::mem::replace(&mut value_bucket, Vec::with_capacity(bucket_len));
            seal_leaf(keys, values, capacity, arena, &mut leaves);
        }
    }

    let mut discarded = 0;
    if !key_bucket.is_empty() {
        match policy {
            RemainderPolicy::Flush => {
                seal_leaf(key_bucket, value_bucket, capacity, arena, &mut leaves);
            }
            RemainderPolicy::Discard => discarded = key_bucket.len(),
        }
    }

    Partition { leaves, discarded }
}

/// Push a new leaf and link it after the previously sealed one.
#[allow(clippy::disallowed_methods)] // The minimum key is kept by leaf and entry
fn seal_leaf<K: Clone, V>(
    keys: Vec<K>,
    values: Vec<V>,
    capacity: usize,
    arena: &mut Vec<Node<K, V>>,
    leaves: &mut Vec<LevelEntry<K>>,
) {
    let Some(min_key) = keys.first().cloned() else {
        return;
    };
    let id = NodeId(arena.len());
    let prev = leaves.last().map(|entry| entry.id);

    arena.push(Node::Leaf(LeafNode::new(keys, values, prev, capacity)));
    if let Some(leaf) = prev.and_then(|prev| arena[prev.0].as_leaf_mut()) {
        leaf.set_next_leaf(id);
    }

    leaves.push(LevelEntry { id, min_key });
}
