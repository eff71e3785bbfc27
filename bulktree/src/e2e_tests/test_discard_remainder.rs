//! Trailing records that do not fill a bucket, under both policies.

use crate::btree::{BPlusTree, RemainderPolicy};
use crate::config::BuildConfig;
use crate::e2e_tests::helpers::*;
use crate::testing::sequential_records;

#[test]
fn test_discard_keeps_whole_buckets_only() {
    let config = BuildConfig::new(2, 1.0).with_remainder(RemainderPolicy::Discard);
    for count in 0..40u32 {
        let tree = BPlusTree::build(sequential_records(count), &config).expect("build");
        assert_well_formed(&tree);

        let kept = (count - count % 4) as usize;
        assert_eq!(tree.len(), kept, "count {count}");
        assert_eq!(tree.discarded(), (count % 4) as usize, "count {count}");
        assert_eq!(chain_keys(&tree), (0..kept as u32).collect::<Vec<_>>());

        if kept == 0 {
            assert_eq!(leaf_sizes(&tree), vec![0], "count {count}");
        } else {
            assert!(leaf_sizes(&tree).iter().all(|&size| size == 4), "count {count}");
        }
    }
}

#[test]
fn test_flush_keeps_every_record() {
    let config = BuildConfig::new(2, 1.0).with_remainder(RemainderPolicy::Flush);
    for count in 1..40u32 {
        let tree = BPlusTree::build(sequential_records(count), &config).expect("build");
        assert_well_formed(&tree);

        assert_eq!(tree.len(), count as usize, "count {count}");
        assert_eq!(tree.discarded(), 0);
        let sizes = leaf_sizes(&tree);
        let expected_last = if count % 4 == 0 { 4 } else { (count % 4) as usize };
        assert_eq!(sizes.last().copied(), Some(expected_last), "count {count}");
        assert_eq!(sizes.len(), count.div_ceil(4) as usize, "count {count}");
    }
}
