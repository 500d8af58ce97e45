//! The resolved on-disk locations used by the `commit-notify` application.

use crate::{
    config::{self, Config, ConfigResult},
    store::FileWatermarkStore,
};
use std::path::{Path, PathBuf};

/// Where the configuration and the watermark live.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AppContext {
    config_path: PathBuf,
    state_path: PathBuf,
}

impl AppContext {
    /// Resolves the context from the given overrides, falling back to the home directory.
    pub fn resolve(config_path: Option<PathBuf>, state_path: Option<PathBuf>) -> ConfigResult<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => config::default_config_path()?,
        };
        let state_path = match state_path {
            Some(path) => path,
            None => config::default_state_path()?,
        };

        Ok(Self {
            config_path,
            state_path,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Loads the configuration, prompting for credentials if there are none or `reconfigure`
    /// is set.
    pub fn load_config(&self, reconfigure: bool) -> ConfigResult<Config> {
        config::load_or_prompt(&self.config_path, reconfigure)
    }

    /// The watermark store.
    pub fn store(&self) -> FileWatermarkStore {
        FileWatermarkStore::new(&self.state_path)
    }
}
