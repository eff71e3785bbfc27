//! Configuration module.
//!
//! [`BuildConfig`] holds the parameters of a tree build. [`LoaderConfig`]
//! wraps it with the table input used by the `bulktree` binary and is loaded
//! from environment variables.
//!
//! # Environment Variables
//!
//! - `BULKTREE_TABLE`: Path of the CSV table to index (required)
//! - `BULKTREE_INDEX_COLUMN`: Column used as the key (default: `id`)
//! - `BULKTREE_ORDER`: Tree order (default: `1`)
//! - `BULKTREE_LOAD`: Target leaf fill in `(0, 1]` (default: `0.66`)
//! - `BULKTREE_REMAINDER`: `flush` or `discard` (default: `flush`)
//! - `BULKTREE_ROUTING`: `first-match` or `last-match` (default: `first-match`)
//!
//! # Invariants
//!
//! - A [`BuildConfig`] is only checked when a build starts; see
//!   [`BuildConfig::max_per_bucket`]
//! - `index_column` is never empty

use std::path::PathBuf;

use crate::btree::{BuildError, RemainderPolicy, RoutingRule};

/// Parameters of a tree build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildConfig {
    /// Node capacity is `2 * order`. Must be at least 1.
    pub order: usize,
    /// Target leaf fill as a fraction of capacity, in `(0, 1]`.
    pub load: f64,
    /// What happens to records that do not fill a last leaf.
    pub remainder: RemainderPolicy,
    /// Routing rule used by [`BPlusTree::get`].
    ///
    /// [`BPlusTree::get`]: crate::btree::BPlusTree::get
    pub routing: RoutingRule,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ORDER, Self::DEFAULT_LOAD)
    }
}

impl BuildConfig {
    /// Default tree order.
    pub const DEFAULT_ORDER: usize = 1;
    /// Default leaf load.
    pub const DEFAULT_LOAD: f64 = 0.66;

    /// Create a config with the default remainder policy and routing rule.
    #[must_use]
    pub const fn new(order: usize, load: f64) -> Self {
        Self {
            order,
            load,
            remainder: RemainderPolicy::Flush,
            routing: RoutingRule::FirstMatch,
        }
    }

    /// Set the remainder policy.
    #[must_use]
    pub const fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// Set the routing rule.
    #[must_use]
    pub const fn with_routing(mut self, routing: RoutingRule) -> Self {
        self.routing = routing;
        self
    }

    /// Capacity tag recorded on every node.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.order.saturating_mul(2)
    }

    /// Validate the parameters and compute `floor(2 * order * load)`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidParameter`] if:
    /// - `order` is zero
    /// - `load` is not in `(0, 1]`
    /// - `floor(2 * order * load)` is zero
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn max_per_bucket(&self) -> Result<usize, BuildError> {
        if self.order == 0 {
            return Err(BuildError::InvalidParameter {
                name: "order",
                message: "must be an integer >= 1".to_string(),
            });
        }
        if !(self.load > 0.0 && self.load <= 1.0) {
            return Err(BuildError::InvalidParameter {
                name: "load",
                message: format!("{} is not in (0, 1]", self.load),
            });
        }

        // load <= 1, so the product never exceeds the capacity.
        let per_bucket = (self.capacity() as f64 * self.load).floor() as usize;
        if per_bucket == 0 {
            return Err(BuildError::InvalidParameter {
                name: "load",
                message: format!(
                    "{} leaves no room in a node of capacity {}",
                    self.load,
                    self.capacity()
                ),
            });
        }
        Ok(per_bucket)
    }
}

/// Configuration of the `bulktree` binary.
///
/// # Post-conditions
///
/// When constructed via `from_env()`:
/// - `table` was set and non-empty
/// - `index_column` is non-empty
/// - `build` fields parsed, but are not range-checked yet
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    /// CSV table to index.
    pub table: PathBuf,
    /// Header name of the key column.
    pub index_column: String,
    /// Tree build parameters.
    pub build: BuildConfig,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl LoaderConfig {
    pub const TABLE_VAR: &'static str = "BULKTREE_TABLE";
    pub const INDEX_COLUMN_VAR: &'static str = "BULKTREE_INDEX_COLUMN";
    pub const ORDER_VAR: &'static str = "BULKTREE_ORDER";
    pub const LOAD_VAR: &'static str = "BULKTREE_LOAD";
    pub const REMAINDER_VAR: &'static str = "BULKTREE_REMAINDER";
    pub const ROUTING_VAR: &'static str = "BULKTREE_ROUTING";

    /// Default key column.
    pub const DEFAULT_INDEX_COLUMN: &'static str = "id";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `BULKTREE_TABLE` is not set or is empty
    /// - `BULKTREE_INDEX_COLUMN` is set but empty
    /// - any other variable is set but does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// # Errors
    ///
    /// Same as [`LoaderConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table = Self::load_table(&lookup)?;
        let index_column = Self::load_index_column(&lookup)?;

        let order = Self::load_parsed(&lookup, Self::ORDER_VAR, BuildConfig::DEFAULT_ORDER)?;
        let load = Self::load_parsed(&lookup, Self::LOAD_VAR, BuildConfig::DEFAULT_LOAD)?;
        let remainder = Self::load_named(
            &lookup,
            Self::REMAINDER_VAR,
            RemainderPolicy::from_name,
            "expected 'flush' or 'discard'",
        )?
        .unwrap_or_default();
        let routing = Self::load_named(
            &lookup,
            Self::ROUTING_VAR,
            RoutingRule::from_name,
            "expected 'first-match' or 'last-match'",
        )?
        .unwrap_or_default();

        Ok(Self {
            table,
            index_column,
            build: BuildConfig::new(order, load)
                .with_remainder(remainder)
                .with_routing(routing),
        })
    }

    /// Load the table path.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or is empty.
    fn load_table<F>(lookup: &F) -> Result<PathBuf, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path =
            lookup(Self::TABLE_VAR).ok_or_else(|| ConfigError::MissingEnvVar(Self::TABLE_VAR.to_string()))?;

        if path.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: Self::TABLE_VAR.to_string(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(PathBuf::from(path))
    }

    /// Load the key column name.
    ///
    /// Returns the default if not set.
    fn load_index_column<F>(lookup: &F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(Self::INDEX_COLUMN_VAR) {
            Some(column) if column.is_empty() => Err(ConfigError::InvalidValue {
                name: Self::INDEX_COLUMN_VAR.to_string(),
                message: "must not be empty".to_string(),
            }),
            Some(column) => Ok(column),
            None => Ok(Self::DEFAULT_INDEX_COLUMN.to_string()),
        }
    }

    /// Load a numeric variable, returning `default` if not set.
    fn load_parsed<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
        T: std::str::FromStr,
    {
        match lookup(name) {
            Some(value) => value.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                message: format!("'{value}' is not a valid number"),
            }),
            None => Ok(default),
        }
    }

    /// Load a variable holding one of a fixed set of names.
    fn load_named<F, T>(
        lookup: &F,
        name: &str,
        parse: fn(&str) -> Option<T>,
        expected: &str,
    ) -> Result<Option<T>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(value) = lookup(name) else {
            return Ok(None);
        };
        parse(value.trim())
            .map(Some)
            .ok_or_else(|| ConfigError::InvalidValue {
                name: name.to_string(),
                message: format!("'{value}': {expected}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_default_values() {
        let config = BuildConfig::default();
        assert_eq!(config.order, 1);
        assert!((config.load - 0.66).abs() < f64::EPSILON);
        assert_eq!(config.remainder, RemainderPolicy::Flush);
        assert_eq!(config.routing, RoutingRule::FirstMatch);
        assert_eq!(LoaderConfig::DEFAULT_INDEX_COLUMN, "id");
    }

    #[test]
    fn test_max_per_bucket() {
        assert_eq!(BuildConfig::new(1, 0.5).max_per_bucket(), Ok(1));
        assert_eq!(BuildConfig::new(2, 1.0).max_per_bucket(), Ok(4));
        assert_eq!(BuildConfig::new(1, 0.66).max_per_bucket(), Ok(1));
        assert_eq!(BuildConfig::new(3, 0.66).max_per_bucket(), Ok(3));
        assert_eq!(BuildConfig::new(10, 0.75).max_per_bucket(), Ok(15));
    }

    #[test]
    fn test_max_per_bucket_rejects_bad_parameters() {
        for config in [
            BuildConfig::new(0, 0.5),
            BuildConfig::new(1, 0.0),
            BuildConfig::new(1, 1.5),
            BuildConfig::new(1, f64::NAN),
            BuildConfig::new(1, 0.4),
        ] {
            assert!(
                matches!(
                    config.max_per_bucket(),
                    Err(BuildError::InvalidParameter { .. })
                ),
                "{config:?}"
            );
        }
    }

    #[test]
    fn test_from_lookup_defaults() {
        let config =
            LoaderConfig::from_lookup(lookup(&[("BULKTREE_TABLE", "people.csv")])).expect("config");
        assert_eq!(config.table, PathBuf::from("people.csv"));
        assert_eq!(config.index_column, "id");
        assert_eq!(config.build, BuildConfig::default());
    }

    #[test]
    fn test_from_lookup_all_values() {
        let config = LoaderConfig::from_lookup(lookup(&[
            ("BULKTREE_TABLE", "t.csv"),
            ("BULKTREE_INDEX_COLUMN", "age"),
            ("BULKTREE_ORDER", "3"),
            ("BULKTREE_LOAD", "0.5"),
            ("BULKTREE_REMAINDER", "discard"),
            ("BULKTREE_ROUTING", "last-match"),
        ]))
        .expect("config");

        assert_eq!(config.index_column, "age");
        assert_eq!(config.build.order, 3);
        assert!((config.build.load - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.build.remainder, RemainderPolicy::Discard);
        assert_eq!(config.build.routing, RoutingRule::LastMatch);
    }

    #[test]
    fn test_from_lookup_missing_table() {
        let err = LoaderConfig::from_lookup(lookup(&[])).expect_err("missing table");
        assert_eq!(err, ConfigError::MissingEnvVar("BULKTREE_TABLE".to_string()));
    }

    #[test]
    fn test_from_lookup_invalid_values() {
        for (name, value) in [
            ("BULKTREE_TABLE", ""),
            ("BULKTREE_INDEX_COLUMN", ""),
            ("BULKTREE_ORDER", "two"),
            ("BULKTREE_ORDER", "-1"),
            ("BULKTREE_LOAD", "half"),
            ("BULKTREE_REMAINDER", "keep"),
            ("BULKTREE_ROUTING", "nearest"),
        ] {
            let mut vars = vec![("BULKTREE_TABLE", "t.csv")];
            vars.push((name, value));
            let err = LoaderConfig::from_lookup(lookup(&vars)).expect_err("invalid value");
            assert!(
                matches!(&err, ConfigError::InvalidValue { name: n, .. } if n == name),
                "{name}={value}: {err}"
            );
        }
    }

    #[test]
    fn test_config_error_display_missing() {
        let error = ConfigError::MissingEnvVar("TEST_VAR".to_string());
        assert_eq!(
            error.to_string(),
            "missing required environment variable: TEST_VAR"
        );
    }

    #[test]
    fn test_config_error_display_invalid() {
        let error = ConfigError::InvalidValue {
            name: "TEST_VAR".to_string(),
            message: "bad value".to_string(),
        };
        assert_eq!(error.to_string(), "invalid value for TEST_VAR: bad value");
    }
}
