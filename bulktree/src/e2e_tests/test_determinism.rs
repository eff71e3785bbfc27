//! Test that the same records produce the same tree regardless of input order.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::btree::BPlusTree;
use crate::config::BuildConfig;
use crate::e2e_tests::helpers::*;
use crate::render::{render_leaf_chain, render_tree};
use crate::testing::seeded_records;

#[test]
fn test_input_order_does_not_matter() {
    let config = BuildConfig::new(2, 0.75);
    let records = seeded_records(99, 180);
    let reference = BPlusTree::build(records.iter().copied(), &config).expect("build");

    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..10 {
        let mut shuffled = records.clone();
        shuffled.shuffle(&mut rng);
        let tree = BPlusTree::build(shuffled, &config).expect("build");
        assert_eq!(tree, reference, "round {round}");
    }
}

#[test]
fn test_rendering_is_stable() {
    let table = TestTable::new(&numbered_table(37));
    let config = BuildConfig::new(2, 0.5);

    let first = table.build("id", &config);
    let second = table.build("id", &config);
    assert_eq!(render_tree(&first), render_tree(&second));
    assert_eq!(render_leaf_chain(&first), render_leaf_chain(&second));
}
