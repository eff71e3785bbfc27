#![cfg_attr(
    test,
    allow(clippy::expect_used, clippy::unwrap_used, clippy::disallowed_methods)
)]

// Life of a build:
// 1. Records come in, in any order
// 2. Stable sort by key
// 3. Slice the sorted run into leaves of floor(2 * order * load) records,
//    linking each leaf to its neighbours
// 4. Group each level into parents, alternating the side that takes the
//    remainder, until one root is left
//
// The tree is read-only from then on: lookups descend by separators, and
// scans walk the leaf chain.

pub mod btree;
pub mod config;
pub mod invariants;
pub mod render;
pub mod table;

mod e2e_tests;
#[cfg(test)]
mod testing;
