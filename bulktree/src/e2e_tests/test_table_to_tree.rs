//! Loading a table from disk and indexing it by a column.

use crate::btree::{BPlusTree, LookupError, RoutingRule};
use crate::config::{BuildConfig, LoaderConfig};
use crate::e2e_tests::helpers::*;
use crate::table::{ColumnKey, TableError, load_records};

#[test]
fn test_index_by_integer_column() {
    let table = TestTable::new(&numbered_table(100));
    let tree = table.build("id", &BuildConfig::default());

    assert_eq!(tree.len(), 100);
    let expected: Vec<ColumnKey> = (0..100).map(ColumnKey::Integer).collect();
    assert_eq!(chain_keys(&tree), expected);

    for id in 0..100 {
        let row = tree.get(&ColumnKey::Integer(id)).expect("present id");
        assert_eq!(row.cells[1], format!("name_{id}"));
    }
    assert_eq!(
        tree.get(&ColumnKey::Integer(100)),
        Err(LookupError::KeyNotFound)
    );
    assert_eq!(
        tree.get(&ColumnKey::Text("0".to_string())),
        Err(LookupError::KeyNotFound)
    );
}

#[test]
fn test_index_by_text_column() {
    let table = TestTable::new(&numbered_table(50));
    let config = BuildConfig::new(3, 0.66).with_routing(RoutingRule::LastMatch);
    let tree = table.build("name", &config);

    let keys = chain_keys(&tree);
    assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    // Text order, not numeric order.
    assert_eq!(keys[0], ColumnKey::Text("name_0".to_string()));
    assert_eq!(keys[1], ColumnKey::Text("name_1".to_string()));
    assert_eq!(keys[2], ColumnKey::Text("name_10".to_string()));

    let row = tree
        .get(&ColumnKey::Text("name_42".to_string()))
        .expect("present name");
    assert_eq!(row.cells[0], "42");
}

#[test]
fn test_mixed_column_orders_integers_first() {
    let table = TestTable::new("code,label\nb7,x\n12,y\na1,z\n-3,w\n");
    let tree = table.build("code", &BuildConfig::new(1, 1.0));

    assert_eq!(
        chain_keys(&tree),
        vec![
            ColumnKey::Integer(-3),
            ColumnKey::Integer(12),
            ColumnKey::Text("a1".to_string()),
            ColumnKey::Text("b7".to_string()),
        ]
    );
}

#[test]
fn test_duplicate_keys_return_first_row_in_file() {
    let table = TestTable::new("id,value\n2,first\n1,other\n2,second\n2,third\n");
    let tree = table.build("id", &BuildConfig::new(2, 1.0));

    let row = tree.get(&ColumnKey::Integer(2)).expect("duplicate key");
    assert_eq!(row.cells[1], "first");
    assert_eq!(row.line, 2);
    assert_eq!(tree.len(), 4);
}

#[test]
fn test_loader_config_drives_the_build() {
    let table = TestTable::new(&numbered_table(40));
    let path = table.path().display().to_string();
    let config = LoaderConfig::from_lookup(|name| match name {
        LoaderConfig::TABLE_VAR => Some(path.clone()),
        LoaderConfig::INDEX_COLUMN_VAR => Some("score".to_string()),
        LoaderConfig::ORDER_VAR => Some("2".to_string()),
        LoaderConfig::LOAD_VAR => Some("0.75".to_string()),
        LoaderConfig::ROUTING_VAR => Some("last-match".to_string()),
        _ => None,
    })
    .expect("valid configuration");

    let records = load_records(&config.table, &config.index_column).expect("load");
    let tree = BPlusTree::build(records, &config.build).expect("build");
    assert_well_formed(&tree);

    assert_eq!(tree.max_per_bucket(), 3);
    assert_eq!(tree.routing(), RoutingRule::LastMatch);
    // Row 13 has score 91, and no other row below 40 does.
    let row = tree.get(&ColumnKey::Integer(91)).expect("present score");
    assert_eq!(row.cells[0], "13");
}

#[test]
fn test_missing_index_column() {
    let table = TestTable::new(&numbered_table(3));
    let err = load_records(table.path(), "email").expect_err("missing column");
    assert!(matches!(err, TableError::MissingColumn(_)));
}
