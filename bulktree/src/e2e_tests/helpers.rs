//! Common helpers for end-to-end tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::btree::{BPlusTree, LeafNode};
use crate::config::BuildConfig;
use crate::invariants::InvariantChecker;
use crate::table::{ColumnKey, Row, load_records};

/// A CSV table written into a temporary directory that is removed on drop.
pub struct TestTable {
    _dir: TempDir,
    path: PathBuf,
}

impl TestTable {
    /// Write `contents` to a fresh `table.csv`.
    #[must_use]
    pub fn new(contents: &str) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("table.csv");
        let mut file = File::create(&path).expect("Failed to create table file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write table file");
        Self { _dir: dir, path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table and build a tree keyed by `index_column`.
    #[must_use]
    pub fn build(&self, index_column: &str, config: &BuildConfig) -> BPlusTree<ColumnKey, Row> {
        let records = load_records(&self.path, index_column).expect("Failed to load table");
        let tree = BPlusTree::build(records, config).expect("Failed to build tree");
        assert_well_formed(&tree);
        tree
    }
}

/// Build a table with `count` rows `i,name_i,score` in descending id order.
#[must_use]
pub fn numbered_table(count: usize) -> String {
    let mut contents = String::from("id,name,score\n");
    for i in (0..count).rev() {
        contents.push_str(&format!("{i},name_{i},{}\n", (i * 7) % 100));
    }
    contents
}

/// Assert the invariant checker finds nothing wrong with `tree`.
pub fn assert_well_formed<K: Ord + std::fmt::Debug, V>(tree: &BPlusTree<K, V>) {
    let mut checker = InvariantChecker::new();
    checker.check_tree(tree);
    assert!(
        !checker.has_violations(),
        "invariant violations: {:?}",
        checker.violations()
    );
}

/// Keys read along the leaf chain, left to right.
#[must_use]
pub fn chain_keys<K: Clone, V>(tree: &BPlusTree<K, V>) -> Vec<K> {
    tree.leaves()
        .flat_map(|leaf| leaf.keys().iter().cloned())
        .collect()
}

/// Leaf sizes along the leaf chain, left to right.
#[must_use]
pub fn leaf_sizes<K, V>(tree: &BPlusTree<K, V>) -> Vec<usize> {
    tree.leaves().map(LeafNode::len).collect()
}
