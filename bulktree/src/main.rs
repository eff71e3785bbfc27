use bulktree::btree::BPlusTree;
use bulktree::config::LoaderConfig;
use bulktree::invariants::InvariantChecker;
use bulktree::render::{describe_node, render_leaf_chain, render_tree};
use bulktree::table::load_records;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bulktree=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration from environment variables
    let config = match LoaderConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: table={}, index_column={}, order={}, load={}",
        config.table.display(),
        config.index_column,
        config.build.order,
        config.build.load
    );

    let records = match load_records(&config.table, &config.index_column) {
        Ok(records) => records,
        Err(e) => {
            tracing::error!("Failed to load table {}: {e}", config.table.display());
            std::process::exit(1);
        }
    };

    let tree = match BPlusTree::build(records, &config.build) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!("Failed to build tree: {e}");
            std::process::exit(1);
        }
    };

    let mut checker = InvariantChecker::new();
    checker.check_tree(&tree);
    for violation in checker.violations() {
        match violation.node {
            Some(id) => tracing::warn!(
                "Invariant violation: {violation} [{}]",
                describe_node(&tree, id)
            ),
            None => tracing::warn!("Invariant violation: {violation}"),
        }
    }

    println!("{}", render_tree(&tree));
    println!();
    println!("{}", render_leaf_chain(&tree));
}
