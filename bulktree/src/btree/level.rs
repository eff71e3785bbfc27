//! Level building: groups one level of nodes into parents until one root
//! remains.
//!
//! # Zigzag grouping
//!
//! A level of `n` nodes becomes `ceil(n / fan_out)` groups whose sizes differ
//! by at most one. The larger groups sit on the edge a pass starts from.
//! Even-numbered passes walk the level right-to-left and odd-numbered passes
//! walk it left-to-right, so the side absorbing the remainder alternates from
//! one level to the next and the tree does not lean to one side.

use crate::btree::node::{InternalNode, Node, NodeId};

/// A node of the level being built, with the smallest key under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LevelEntry<K> {
    pub id: NodeId,
    pub min_key: K,
}

/// Number of parents created for a level of `width` nodes.
#[must_use]
pub const fn group_count(width: usize, fan_out: usize) -> usize {
    width.div_ceil(fan_out)
}

/// Split `width` members into `groups` sizes that differ by at most one.
///
/// The larger sizes come first.
#[must_use]
pub fn balanced_group_sizes(width: usize, groups: usize) -> Vec<usize> {
    if groups == 0 {
        return Vec::new();
    }
    let base = width / groups;
    let extra = width % groups;
    (0..groups).map(|i| base + usize::from(i < extra)).collect()
}

/// Group one level of nodes for the pass numbered `iteration`.
///
/// Returns groups in ascending order, each group's members in ascending
/// order. On even iterations the level is reversed before grouping, each
/// group is reversed back, and the list of groups is reversed, which places
/// the larger groups on the right edge. On odd iterations the level is
/// grouped as is, which places them on the left edge.
///
/// `fan_out` is the largest number of members a group may hold and must be
/// at least 1.
#[must_use]
pub fn zigzag_groups<T>(mut level: Vec<T>, fan_out: usize, iteration: usize) -> Vec<Vec<T>> {
    debug_assert!(fan_out >= 1);
    if level.is_empty() {
        return Vec::new();
    }

    let reversed = iteration % 2 == 0;
    if reversed {
        level.reverse();
    }

    let sizes = balanced_group_sizes(level.len(), group_count(level.len(), fan_out.max(1)));
    let mut members = level.into_iter();
    let mut groups: Vec<Vec<T>> = sizes
        .into_iter()
        .map(|size| {
            let mut group: Vec<T> = members.by_ref().take(size).collect();
            if reversed {
                group.reverse();
            }
            group
        })
        .collect();

    if reversed {
        groups.reverse();
    }
    groups
}

/// Build parent levels above `level` until a single root remains.
///
/// Returns `None` if `level` is empty.
pub(crate) fn build_levels<K, V>(
    mut level: Vec<LevelEntry<K>>,
    fan_out: usize,
    capacity: usize,
    arena: &mut Vec<Node<K, V>>,
) -> Option<LevelEntry<K>>
where
    K: Ord + Clone,
{
    debug_assert!(fan_out >= 2, "fan-out below 2 never shrinks a level");

    let mut iteration = 0;
    while level.len() > 1 {
        let width = level.len();
        let groups = zigzag_groups(level, fan_out, iteration);
        tracing::debug!(
            iteration,
            width,
            groups = groups.len(),
            right_to_left = iteration % 2 == 0,
            "building tree level"
        );

        level = groups
            .into_iter()
            .map(|group| join_group(group, capacity, arena))
            .collect::<Option<Vec<_>>>()?;
        iteration += 1;
    }

    level.pop()
}

/// Turn one group into the entry that represents it on the next level.
///
/// A single member passes through unchanged.
#[allow(clippy::disallowed_methods)] // The first member's minimum is kept by node and entry
fn join_group<K, V>(
    group: Vec<LevelEntry<K>>,
    capacity: usize,
    arena: &mut Vec<Node<K, V>>,
) -> Option<LevelEntry<K>>
where
    K: Ord + Clone,
{
    let mut members = group.into_iter();
    let first = members.next()?;
    let Some(second) = members.next() else {
        return Some(first);
    };

    let mut children = vec![first.id, second.id];
    let mut separators = vec![second.min_key];
    for member in members {
        children.push(member.id);
        separators.push(member.min_key);
    }

    let id = NodeId(arena.len());
    arena.push(Node::Internal(InternalNode::new(
        children,
        separators,
        first.min_key.clone(),
        capacity,
    )));

    Some(LevelEntry {
        id,
        min_key: first.min_key,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::node::LeafNode;

    fn sizes<T>(groups: &[Vec<T>]) -> Vec<usize> {
        groups.iter().map(Vec::len).collect()
    }

    #[test]
    fn test_group_count() {
        assert_eq!(group_count(6, 2), 3);
        assert_eq!(group_count(7, 3), 3);
        assert_eq!(group_count(1, 5), 1);
        assert_eq!(group_count(0, 5), 0);
    }

    #[test]
    fn test_balanced_group_sizes() {
        assert_eq!(balanced_group_sizes(7, 3), vec![3, 2, 2]);
        assert_eq!(balanced_group_sizes(9, 3), vec![3, 3, 3]);
        assert_eq!(balanced_group_sizes(3, 2), vec![2, 1]);
        assert!(balanced_group_sizes(4, 0).is_empty());
    }

    #[test]
    fn test_odd_iteration_puts_larger_groups_left() {
        let groups = zigzag_groups((0..7).collect(), 3, 1);
        assert_eq!(groups, vec![vec![0, 1, 2], vec![3, 4], vec![5, 6]]);
    }

    #[test]
    fn test_even_iteration_puts_larger_groups_right() {
        let groups = zigzag_groups((0..7).collect(), 3, 0);
        assert_eq!(groups, vec![vec![0, 1], vec![2, 3], vec![4, 5, 6]]);
    }

    #[test]
    fn test_zigzag_preserves_order() {
        for width in 1..40 {
            for fan_out in 2..7 {
                for iteration in 0..2 {
                    let groups = zigzag_groups((0..width).collect(), fan_out, iteration);
                    let flat: Vec<usize> = groups.iter().flatten().copied().collect();
                    assert_eq!(flat, (0..width).collect::<Vec<_>>());
                }
            }
        }
    }

    #[test]
    fn test_zigzag_group_sizes_are_balanced() {
        for width in 1..60 {
            for fan_out in 2..9 {
                for iteration in 0..2 {
                    let groups = zigzag_groups((0..width).collect::<Vec<_>>(), fan_out, iteration);
                    let group_sizes = sizes(&groups);
                    let max = group_sizes.iter().max().copied().unwrap_or(0);
                    let min = group_sizes.iter().min().copied().unwrap_or(0);
                    assert_eq!(groups.len(), group_count(width, fan_out));
                    assert!(max <= fan_out, "width {width} fan_out {fan_out}");
                    assert!(max - min <= 1, "width {width} fan_out {fan_out}");
                }
            }
        }
    }

    #[test]
    fn test_zigzag_empty_level() {
        assert!(zigzag_groups(Vec::<u8>::new(), 3, 0).is_empty());
    }

    fn leaf_level(arena: &mut Vec<Node<u32, ()>>, count: u32) -> Vec<LevelEntry<u32>> {
        (0..count)
            .map(|i| {
                let id = NodeId(arena.len());
                arena.push(Node::Leaf(LeafNode::new(vec![i * 10], vec![()], None, 2)));
                LevelEntry { id, min_key: i * 10 }
            })
            .collect()
    }

    #[test]
    fn test_single_entry_is_the_root() {
        let mut arena = Vec::new();
        let level = leaf_level(&mut arena, 1);
        let root = build_levels(level, 2, 2, &mut arena).expect("root");
        assert_eq!(root.id.index(), 0);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_empty_level_has_no_root() {
        let mut arena: Vec<Node<u32, ()>> = Vec::new();
        assert!(build_levels(Vec::new(), 2, 2, &mut arena).is_none());
    }

    #[test]
    fn test_three_leaves_pass_one_through() {
        let mut arena = Vec::new();
        let level = leaf_level(&mut arena, 3);
        let root = build_levels(level, 2, 2, &mut arena).expect("root");

        // Pass 0 is right-to-left: [0] passes through, [10, 20] are joined.
        let root_node = arena[root.id.0].as_internal().expect("internal root");
        assert_eq!(root_node.separators(), &[10]);
        assert_eq!(root.min_key, 0);
        assert_eq!(root_node.children()[0], NodeId(0));

        let right = arena[root_node.children()[1].0]
            .as_internal()
            .expect("internal child");
        assert_eq!(right.children(), &[NodeId(1), NodeId(2)]);
        assert_eq!(right.separators(), &[20]);
        assert_eq!(*right.min_key(), 10);
    }

    #[test]
    fn test_separators_are_child_minimums() {
        let mut arena = Vec::new();
        let level = leaf_level(&mut arena, 11);
        build_levels(level, 3, 4, &mut arena).expect("root");

        for node in &arena {
            let Some(internal) = node.as_internal() else {
                continue;
            };
            assert_eq!(internal.separators().len() + 1, internal.children().len());
            assert_eq!(internal.capacity(), 4);
            for (i, separator) in internal.separators().iter().enumerate() {
                let child = &arena[internal.children()[i + 1].0];
                assert_eq!(child.min_key(), Some(separator));
            }
        }
    }
}
