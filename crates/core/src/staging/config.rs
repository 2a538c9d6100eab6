//! Configuration for the staging module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where and how scratch files are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagingConfig {
    /// Directory holding in-flight input and output files.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// File name prefix for staged files.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("tunegrab")
}

fn default_prefix() -> String {
    "tunegrab".to_string()
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
            prefix: default_prefix(),
        }
    }
}

impl StagingConfig {
    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StagingConfig::default();
        assert!(config.temp_dir.ends_with("tunegrab"));
        assert_eq!(config.prefix, "tunegrab");
    }

    #[test]
    fn test_with_temp_dir() {
        let config = StagingConfig::default().with_temp_dir(PathBuf::from("/scratch"));
        assert_eq!(config.temp_dir, PathBuf::from("/scratch"));
    }
}
