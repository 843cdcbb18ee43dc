//! Configuration for the shared-region manager

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for [`RegionManager`](super::RegionManager)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Scratch directory for region files; defaults to a per-process
    /// subdirectory under the platform temporary-files root
    pub scratch_dir: Option<PathBuf>,
    /// Advisory ceiling for aggregate region bytes; exceeding it is logged,
    /// never rejected
    pub max_shared_memory_bytes: usize,
    /// Prefix for region file names
    pub file_prefix: String,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            scratch_dir: None,
            max_shared_memory_bytes: 512 * 1024 * 1024,
            file_prefix: "region_".to_string(),
        }
    }
}

impl RegionConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the scratch directory
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = Some(dir.into());
        self
    }

    /// Set the advisory memory ceiling
    pub fn with_max_shared_memory_bytes(mut self, bytes: usize) -> Self {
        self.max_shared_memory_bytes = bytes;
        self
    }

    /// Set the region file name prefix
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::BridgeError;

        if self.max_shared_memory_bytes == 0 {
            return Err(BridgeError::invalid_parameter(
                "max_shared_memory_bytes",
                "Advisory memory ceiling cannot be zero",
            ));
        }

        if self.file_prefix.contains(std::path::MAIN_SEPARATOR) {
            return Err(BridgeError::invalid_parameter(
                "file_prefix",
                "File prefix cannot contain path separators",
            ));
        }

        Ok(())
    }

    /// Resolve the scratch directory for this configuration
    pub fn resolve_scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(|| {
            std::env::temp_dir().join(format!("framebridge-{}", std::process::id()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(RegionConfig::default().validate().is_ok());
    }

    #[test]
    fn prefix_with_separator_is_rejected() {
        let config = RegionConfig::default().with_file_prefix("a/b");
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_scratch_dir_is_per_process() {
        let dir = RegionConfig::default().resolve_scratch_dir();
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("framebridge-"));
    }
}
