//! Configuration file loading

use super::schema::Config;
use crate::error::{RelayError, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Find user config by checking environment and standard locations
    pub fn find_user_config() -> Option<PathBuf> {
        // 1. $PIPEHELPER_CONFIG
        if let Ok(path) = env::var("PIPEHELPER_CONFIG") {
            let p = PathBuf::from(path);
            if p.exists() {
                return Some(p);
            }
        }

        // 2. $XDG_CONFIG_HOME/pipehelper/config.toml
        if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
            let p = PathBuf::from(xdg).join("pipehelper/config.toml");
            if p.exists() {
                return Some(p);
            }
        }

        // 3. ~/.config/pipehelper/config.toml
        if let Ok(home) = env::var("HOME") {
            let p = PathBuf::from(home).join(".config/pipehelper/config.toml");
            if p.exists() {
                return Some(p);
            }
        }

        None
    }

    /// Load and validate config from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| RelayError::ConfigLoad {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to defaults
    /// Priority: explicit path > user config > defaults
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Config> {
        if let Some(path) = explicit {
            tracing::debug!("Loading explicit config from {:?}", path);
            return Self::load_from_file(path);
        }

        match Self::find_user_config() {
            Some(path) => {
                tracing::debug!("Loading user config from {:?}", path);
                Self::load_from_file(&path)
            }
            None => {
                tracing::debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }
}
