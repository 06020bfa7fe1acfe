//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::AliasConfig;

/// Location of the configuration file relative to the project root.
pub const ANCHOR_FILE: &str = "dynamics/config.yaml";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate project root via anchor {anchor} (searched upward from {})", .start.display())]
    RootNotFound { anchor: &'static str, start: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A parsed configuration document together with the root it was found under.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: AliasConfig,
    pub root: PathBuf,
}

impl LoadedConfig {
    /// Absolute location of the configuration file.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(ANCHOR_FILE)
    }
}

/// Find the nearest directory, starting at `start` itself, that contains the anchor file.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    start
        .ancestors()
        .find(|dir| dir.join(ANCHOR_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Locate the project root above `start` and parse its configuration file.
pub fn load_config(start: &Path) -> Result<LoadedConfig, ConfigError> {
    let root = find_project_root(start).ok_or_else(|| ConfigError::RootNotFound {
        anchor: ANCHOR_FILE,
        start: start.to_path_buf(),
    })?;

    let path = root.join(ANCHOR_FILE);
    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = parse_config(&content).map_err(|source| ConfigError::Parse { path, source })?;

    Ok(LoadedConfig { config, root })
}

/// Parse a configuration document. An empty document yields the default configuration.
pub fn parse_config(content: &str) -> Result<AliasConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(AliasConfig::default());
    }
    let config: Option<AliasConfig> = serde_yaml::from_str(content)?;
    Ok(config.unwrap_or_default())
}
