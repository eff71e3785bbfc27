//! End-to-end tests from input records to lookups and scans.
//!
//! Each test file covers a specific scenario, using deterministic inputs
//! to verify the complete build/lookup cycle.

#![cfg(test)]

mod helpers;

mod test_determinism;
mod test_discard_remainder;
mod test_random_workloads;
mod test_routing_rules;
mod test_scenarios;
mod test_table_to_tree;
