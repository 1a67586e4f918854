//! Configuration for a dealership store.

use std::path::{Path, PathBuf};

use lotstore_core::{LotError, LotResult};

/// Dealership store configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory holding all record and index files.
    pub root_dir: PathBuf,
    /// Reject appends whose natural key is already indexed.
    ///
    /// Off by default: the historical behavior allows duplicate keys and
    /// resolves lookups first-match-wins.
    pub strict_unique_keys: bool,
}

impl Config {
    /// Configuration with the default permissive key behavior.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
            strict_unique_keys: false,
        }
    }

    /// Enable strict key uniqueness.
    pub fn strict(mut self) -> Self {
        self.strict_unique_keys = true;
        self
    }

    /// Root directory path.
    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    /// Validate all configuration parameters.
    pub fn validate(&self) -> LotResult<()> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(LotError::Config("root_dir must not be empty".into()));
        }
        Ok(())
    }
}
