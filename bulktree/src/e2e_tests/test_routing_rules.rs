//! First-match and last-match routing over the same trees.

use crate::btree::{BPlusTree, LookupError, RoutingRule};
use crate::config::BuildConfig;
use crate::testing::{seeded_records, sequential_records};

#[test]
fn test_rules_agree_when_nodes_have_two_children() {
    // A bucket of one record gives a fan-out of two, so every internal node
    // has a single separator.
    let records = seeded_records(5, 333);
    for rule in [RoutingRule::FirstMatch, RoutingRule::LastMatch] {
        let config = BuildConfig::new(2, 0.25).with_routing(rule);
        let tree = BPlusTree::build(records.iter().copied(), &config).expect("build");
        assert_eq!(tree.max_per_bucket(), 1);

        for (key, value) in &records {
            assert_eq!(tree.get(key), Ok(value), "{rule:?} key {key}");
        }
    }
}

#[test]
fn test_first_match_hits_are_a_subset_of_last_match() {
    let config = BuildConfig::new(3, 1.0);
    let tree = BPlusTree::build(sequential_records(500), &config).expect("build");

    let mut first_hits = 0;
    let mut last_hits = 0;
    for key in 0..500 {
        let first = tree.get_with(&key, RoutingRule::FirstMatch);
        let last = tree.get_with(&key, RoutingRule::LastMatch);
        assert_eq!(last, Ok(&(key * 10)), "key {key}");
        if first.is_ok() {
            assert_eq!(first, last, "key {key}");
            first_hits += 1;
        } else {
            assert_eq!(first, Err(LookupError::KeyNotFound));
        }
        last_hits += 1;
    }
    assert_eq!(last_hits, 500);
    assert!(first_hits < last_hits);
    assert!(first_hits > 0);
}

#[test]
fn test_get_uses_configured_rule() {
    let records = sequential_records(500);
    let first = BPlusTree::build(records.iter().copied(), &BuildConfig::new(3, 1.0))
        .expect("build");
    let last = BPlusTree::build(
        records,
        &BuildConfig::new(3, 1.0).with_routing(RoutingRule::LastMatch),
    )
    .expect("build");

    for key in 0..500 {
        assert_eq!(
            first.get(&key),
            first.get_with(&key, RoutingRule::FirstMatch)
        );
        assert_eq!(last.get(&key), last.get_with(&key, RoutingRule::LastMatch));
    }
}
