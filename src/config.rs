use std::fmt;
use std::fs;
use std::path::Path;

use bitvox_runtime::EngineConfig;
use bitvox_world::TerrainConfig;
use serde::Deserialize;

/// Top-level `bitvox.toml`: one table per subsystem, every field optional.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub terrain: TerrainConfig,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "reading config: {e}"),
            ConfigError::Parse(e) => write!(f, "parsing config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

pub fn parse_config(s: &str) -> Result<AppConfig, ConfigError> {
    Ok(toml::from_str(s)?)
}

/// Reads `path`; a missing file falls back to defaults, a malformed one is an error.
pub fn load_config_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
    match fs::read_to_string(path) {
        Ok(s) => parse_config(&s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::warn!("{} not found, using defaults", path.display());
            Ok(AppConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}
