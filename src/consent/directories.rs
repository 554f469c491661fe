//! Root directory naming per consent state

use std::path::{Path, PathBuf};

use crate::types::Consent;

/// Maps a consent state to the root directory its data lives in
///
/// Must return the same path for the same state for the lifetime of the
/// writers that use it.
pub trait RootDirectoryProvider: Send + Sync {
    fn root_dir(&self, consent: Consent) -> PathBuf;
}

/// Versioned per-feature directories under one base directory
///
/// ```text
/// <base>/<feature>-pending-v1
/// <base>/<feature>-v1
/// <base>/<feature>-not-granted-v1
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDirectories {
    base_dir: PathBuf,
    feature: String,
}

impl FeatureDirectories {
    /// Layout version baked into directory names
    pub const VERSION: u32 = 1;

    pub fn new<P: AsRef<Path>>(base_dir: P, feature: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            feature: feature.into(),
        }
    }
}

impl RootDirectoryProvider for FeatureDirectories {
    fn root_dir(&self, consent: Consent) -> PathBuf {
        let name = match consent {
            Consent::Pending => format!("{}-pending-v{}", self.feature, Self::VERSION),
            Consent::Granted => format!("{}-v{}", self.feature, Self::VERSION),
            Consent::NotGranted => format!("{}-not-granted-v{}", self.feature, Self::VERSION),
        };
        self.base_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_distinct_and_stable() {
        let dirs = FeatureDirectories::new("/data", "logs");

        assert_eq!(dirs.root_dir(Consent::Pending), PathBuf::from("/data/logs-pending-v1"));
        assert_eq!(dirs.root_dir(Consent::Granted), PathBuf::from("/data/logs-v1"));
        assert_eq!(
            dirs.root_dir(Consent::NotGranted),
            PathBuf::from("/data/logs-not-granted-v1")
        );
        assert_eq!(dirs.root_dir(Consent::Granted), dirs.root_dir(Consent::Granted));
    }
}
