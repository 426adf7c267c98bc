//! Config store for loading enforcer.toml.

use std::path::{Path, PathBuf};

use super::{EnforcerConfig, parser, paths};

#[derive(Debug, Clone)]
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Store at the default location under the user's config directory.
    pub fn with_defaults() -> anyhow::Result<Self> {
        Ok(Self::from_dir(&paths::default_config_dir()?))
    }

    pub fn from_dir(config_dir: &Path) -> Self {
        Self::from_path(paths::config_path_in(config_dir))
    }

    pub fn from_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load the config. A missing file yields the defaults.
    pub fn load(&self) -> anyhow::Result<EnforcerConfig> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "No config file, using defaults");
            return Ok(EnforcerConfig::new());
        }
        parser::parse_enforcer_toml(&self.config_path)
    }
}
