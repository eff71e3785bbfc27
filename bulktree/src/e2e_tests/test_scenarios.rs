//! The reference scenarios, driven through a CSV table.

use crate::btree::{LookupError, RemainderPolicy};
use crate::config::BuildConfig;
use crate::e2e_tests::helpers::*;
use crate::render::render_tree;
use crate::table::ColumnKey;

const LETTERS: &str = "id,letter\n1,a\n2,b\n3,c\n4,d\n5,e\n6,f\n";

#[test]
fn test_six_single_entry_leaves() {
    let table = TestTable::new(LETTERS);
    let tree = table.build("id", &BuildConfig::new(1, 0.5));

    assert_eq!(tree.max_per_bucket(), 1);
    assert_eq!(leaf_sizes(&tree), vec![1; 6]);

    let row = tree.get(&ColumnKey::Integer(4)).expect("key 4");
    assert_eq!(row.cells[1], "d");
    assert_eq!(
        tree.get(&ColumnKey::Integer(7)),
        Err(LookupError::KeyNotFound)
    );
}

#[test]
fn test_six_single_entry_leaves_shape() {
    let table = TestTable::new(LETTERS);
    let tree = table.build("id", &BuildConfig::new(1, 0.5));

    // Pass 0 pairs the leaves, pass 1 joins the first two pairs and lets
    // the third pass through, pass 2 joins what is left.
    assert_eq!(
        render_tree(&tree),
        "Internal[5, NA]\n\
         Internal[3, NA]  Internal[6, NA]\n\
         Internal[2, NA]  Internal[4, NA]  Leaf[5, NA]  Leaf[6, NA]\n\
         Leaf[1, NA]  Leaf[2, NA]  Leaf[3, NA]  Leaf[4, NA]"
    );
    assert_eq!(tree.height(), 4);

    for (key, letter) in [(1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e"), (6, "f")] {
        let row = tree.get(&ColumnKey::Integer(key)).expect("present key");
        assert_eq!(row.cells[1], letter, "key {key}");
    }
}

#[test]
fn test_nine_records_discard_remainder() {
    let table = TestTable::new(&numbered_table(9));
    let config = BuildConfig::new(2, 1.0).with_remainder(RemainderPolicy::Discard);
    let tree = table.build("id", &config);

    assert_eq!(tree.max_per_bucket(), 4);
    assert_eq!(leaf_sizes(&tree), vec![4, 4]);
    assert_eq!(tree.discarded(), 1);
    assert_eq!(
        tree.get(&ColumnKey::Integer(8)),
        Err(LookupError::KeyNotFound)
    );
    assert!(tree.get(&ColumnKey::Integer(7)).is_ok());
}

#[test]
fn test_nine_records_flush_remainder() {
    let table = TestTable::new(&numbered_table(9));
    let tree = table.build("id", &BuildConfig::new(2, 1.0));

    assert_eq!(leaf_sizes(&tree), vec![4, 4, 1]);
    assert_eq!(tree.discarded(), 0);
    let row = tree.get(&ColumnKey::Integer(8)).expect("flushed key");
    assert_eq!(row.cells[1], "name_8");
}

#[test]
fn test_zigzag_alternates_remainder_edge() {
    // 26 records, two per leaf: 13 leaves under fan-out 3. Pass 0 makes
    // five groups [2, 2, 3, 3, 3] with the larger ones on the right, pass 1
    // makes two groups [3, 2] with the larger one on the left.
    let table = TestTable::new(&numbered_table(26));
    let tree = table.build("id", &BuildConfig::new(1, 1.0));

    let leaves = (0..13)
        .map(|i| format!("Leaf[{}, {}]", 2 * i, 2 * i + 1))
        .collect::<Vec<_>>()
        .join("  ");
    let expected = [
        "Internal[14, NA]".to_string(),
        "Internal[4, 8]  Internal[20, NA]".to_string(),
        "Internal[2, NA]  Internal[6, NA]  Internal[10, 12]  Internal[16, 18]  Internal[22, 24]"
            .to_string(),
        leaves,
    ]
    .join("\n");

    assert_eq!(render_tree(&tree), expected);
    assert_eq!(tree.height(), 4);
}
