//! Reproducible record generators for tests.
//!
//! All randomness is seeded, so a failing case can be replayed from its
//! seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// `count` records `(i, i * 10)` in ascending key order.
#[must_use]
pub fn sequential_records(count: u32) -> Vec<(u32, u32)> {
    (0..count).map(|i| (i, i * 10)).collect()
}

/// `count` records with distinct, shuffled keys and random values.
///
/// Keys are spread over `0..count * 4` so lookups for absent keys can be
/// generated in the gaps.
#[must_use]
pub fn seeded_records(seed: u64, count: usize) -> Vec<(u64, u64)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut keys: Vec<u64> = (0..count as u64 * 4).collect();
    keys.shuffle(&mut rng);
    keys.truncate(count);
    keys.into_iter().map(|key| (key, rng.random())).collect()
}

/// Keys in `0..count * 4` that [`seeded_records`] did not produce.
#[must_use]
pub fn absent_keys(records: &[(u64, u64)], count: usize) -> Vec<u64> {
    let mut present: Vec<u64> = records.iter().map(|(key, _)| *key).collect();
    present.sort_unstable();
    (0..count as u64 * 4)
        .filter(|key| present.binary_search(key).is_err())
        .collect()
}

/// Draw a random `(order, load)` pair that passes build validation.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn random_parameters(rng: &mut StdRng) -> (usize, f64) {
    let order: usize = rng.random_range(1..=6);
    let capacity = 2 * order;
    // Aim between two bucket sizes so rounding cannot land below the target.
    let per_bucket = rng.random_range(1..=capacity);
    let load = ((per_bucket as f64 + 0.5) / capacity as f64).min(1.0);
    (order, load)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_records_are_reproducible() {
        assert_eq!(seeded_records(42, 100), seeded_records(42, 100));
        assert_ne!(seeded_records(42, 100), seeded_records(43, 100));
    }

    #[test]
    fn test_seeded_records_have_distinct_keys() {
        let records = seeded_records(5, 250);
        let mut keys: Vec<u64> = records.iter().map(|(k, _)| *k).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 250);
        assert!(keys.iter().all(|k| *k < 1000));
    }

    #[test]
    fn test_absent_keys_are_absent() {
        let records = seeded_records(9, 50);
        let absent = absent_keys(&records, 50);
        assert_eq!(absent.len(), 150);
        assert!(absent.iter().all(|k| records.iter().all(|(r, _)| r != k)));
    }

    #[test]
    fn test_random_parameters_validate() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let (order, load) = random_parameters(&mut rng);
            let config = crate::config::BuildConfig::new(order, load);
            assert!(config.max_per_bucket().is_ok(), "order {order} load {load}");
        }
    }
}
