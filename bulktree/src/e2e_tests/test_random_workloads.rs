//! Seeded random workloads across many `(order, load)` pairs.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::btree::{BPlusTree, LookupError, RoutingRule};
use crate::config::BuildConfig;
use crate::e2e_tests::helpers::*;
use crate::testing::{absent_keys, random_parameters, seeded_records};

const SEEDS: u64 = 25;

#[test]
fn test_every_present_key_is_found() {
    let mut rng = StdRng::seed_from_u64(0xB7EE);
    for seed in 0..SEEDS {
        let (order, load) = random_parameters(&mut rng);
        let config = BuildConfig::new(order, load).with_routing(RoutingRule::LastMatch);
        let records = seeded_records(seed, 400);
        let tree = BPlusTree::build(records.iter().copied(), &config).expect("build");
        assert_well_formed(&tree);

        assert_eq!(tree.len(), records.len(), "seed {seed}");
        for (key, value) in &records {
            assert_eq!(tree.get(key), Ok(value), "seed {seed} key {key}");
        }
    }
}

#[test]
fn test_absent_keys_are_not_found() {
    let mut rng = StdRng::seed_from_u64(0xAB5E);
    for seed in 0..SEEDS {
        let (order, load) = random_parameters(&mut rng);
        let records = seeded_records(seed, 200);
        let tree =
            BPlusTree::build(records.iter().copied(), &BuildConfig::new(order, load)).expect("build");

        for key in absent_keys(&records, 200) {
            for rule in [RoutingRule::FirstMatch, RoutingRule::LastMatch] {
                assert_eq!(
                    tree.get_with(&key, rule),
                    Err(LookupError::KeyNotFound),
                    "seed {seed} key {key} {rule:?}"
                );
            }
        }
    }
}

#[test]
fn test_scan_matches_sorted_input() {
    let mut rng = StdRng::seed_from_u64(0x5CA7);
    for seed in 0..SEEDS {
        let (order, load) = random_parameters(&mut rng);
        let mut records = seeded_records(seed, 300);
        let tree =
            BPlusTree::build(records.iter().copied(), &BuildConfig::new(order, load)).expect("build");

        records.sort_unstable();
        let scanned: Vec<(u64, u64)> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(scanned, records, "seed {seed}");

        let full = tree.max_per_bucket();
        let sizes = leaf_sizes(&tree);
        let (last, rest) = sizes.split_last().expect("at least one leaf");
        assert!(rest.iter().all(|&size| size == full), "seed {seed}");
        assert!((1..=full).contains(last), "seed {seed}");
    }
}

#[test]
fn test_first_match_hits_are_correct() {
    let mut rng = StdRng::seed_from_u64(0xF125);
    for seed in 0..SEEDS {
        let (order, load) = random_parameters(&mut rng);
        let records = seeded_records(seed, 250);
        let tree =
            BPlusTree::build(records.iter().copied(), &BuildConfig::new(order, load)).expect("build");

        for (key, value) in &records {
            match tree.get_with(key, RoutingRule::FirstMatch) {
                Ok(found) => assert_eq!(found, value, "seed {seed} key {key}"),
                Err(err) => assert_eq!(err, LookupError::KeyNotFound, "seed {seed} key {key}"),
            }
        }
    }
}
