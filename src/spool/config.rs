//! Spool configuration

use std::env;
use std::path::{Path, PathBuf};

use crate::error::{SpoolError, SpoolResult};

/// Default maximum size of a batch file (4 MiB)
pub const DEFAULT_MAX_BATCH_SIZE: u64 = 4 * 1024 * 1024;

/// Default maximum age of a batch file that can still be appended to
pub const DEFAULT_MAX_FILE_AGE_MS: u64 = 5_000;

/// Default number of concurrent migration workers
pub const DEFAULT_MIGRATION_WORKERS: usize = 4;

/// Rotation thresholds for a batch writer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// A file is rotated before it would reach this many bytes
    pub max_batch_size: u64,
    /// A file older than this (by its name) is never appended to
    pub max_file_age_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_file_age_ms: DEFAULT_MAX_FILE_AGE_MS,
        }
    }
}

impl BatchConfig {
    pub fn new(max_batch_size: u64, max_file_age_ms: u64) -> Self {
        Self {
            max_batch_size,
            max_file_age_ms,
        }
    }
}

/// Configuration for a consent-aware spool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolConfig {
    /// Base directory holding one root directory per consent state
    pub data_dir: PathBuf,
    /// Feature name used to derive root directory names
    pub feature: String,
    /// Rotation thresholds
    pub batch: BatchConfig,
    /// Maximum number of migrations running at once
    pub migration_workers: usize,
}

impl Default for SpoolConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("spool"),
            feature: "logs".to_string(),
            batch: BatchConfig::default(),
            migration_workers: DEFAULT_MIGRATION_WORKERS,
        }
    }
}

impl SpoolConfig {
    /// Create config with custom data directory
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        self.feature = feature.into();
        self
    }

    pub fn with_batch(mut self, batch: BatchConfig) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_migration_workers(mut self, workers: usize) -> Self {
        self.migration_workers = workers;
        self
    }

    /// Build configuration from `SPOOL_*` environment variables
    ///
    /// Unset variables keep their defaults. Relative data directories are
    /// resolved against the current directory.
    pub fn from_env() -> SpoolResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> SpoolResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let current_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let data_dir = lookup("SPOOL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| config.data_dir.clone());
        config.data_dir = if data_dir.is_absolute() {
            data_dir
        } else {
            current_dir.join(data_dir)
        };

        if let Some(feature) = lookup("SPOOL_FEATURE") {
            if feature.trim().is_empty() {
                return Err(SpoolError::config("SPOOL_FEATURE must not be empty"));
            }
            config.feature = feature;
        }
        if let Some(value) = lookup("SPOOL_MAX_BATCH_SIZE") {
            config.batch.max_batch_size = parse_number("SPOOL_MAX_BATCH_SIZE", &value)?;
        }
        if let Some(value) = lookup("SPOOL_MAX_FILE_AGE_MS") {
            config.batch.max_file_age_ms = parse_number("SPOOL_MAX_FILE_AGE_MS", &value)?;
        }
        if let Some(value) = lookup("SPOOL_MIGRATION_WORKERS") {
            config.migration_workers = parse_number("SPOOL_MIGRATION_WORKERS", &value)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> SpoolResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SpoolError::config(format!("{} is not a valid number: {:?}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_env_empty() {
        let config = SpoolConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.batch, BatchConfig::default());
        assert_eq!(config.feature, "logs");
        assert!(config.data_dir.is_absolute());
        assert!(config.data_dir.ends_with("spool"));
    }

    #[test]
    fn test_overrides() {
        let config = SpoolConfig::from_lookup(lookup_from(&[
            ("SPOOL_DATA_DIR", "/var/spool/app"),
            ("SPOOL_FEATURE", "rum"),
            ("SPOOL_MAX_BATCH_SIZE", "1024"),
            ("SPOOL_MAX_FILE_AGE_MS", " 60000 "),
            ("SPOOL_MIGRATION_WORKERS", "2"),
        ]))
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/spool/app"));
        assert_eq!(config.feature, "rum");
        assert_eq!(config.batch, BatchConfig::new(1024, 60_000));
        assert_eq!(config.migration_workers, 2);
    }

    #[test]
    fn test_invalid_number() {
        let err = SpoolConfig::from_lookup(lookup_from(&[("SPOOL_MAX_BATCH_SIZE", "big")]))
            .unwrap_err();
        assert!(matches!(err, SpoolError::Config(_)));
    }
}
