use std::{
    fs::{self, File},
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use crate::{Config, ConfigError};

const CONFIG_FILE: &str = "config.json";
const STAGING_EXTENSION: &str = "json.tmp";

/// Reads and writes `config.json`. Relative paths inside the config resolve
/// against the base directory.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    base_dir: PathBuf,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses an explicit config file; its parent directory becomes the base.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let config_path = config_path.into();
        let base_dir = match config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            base_dir,
            config_path,
        }
    }

    /// Creates `base` if needed and keeps `config.json` directly inside it.
    pub fn with_base_dir(base: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let base_dir = base.into();
        fs::create_dir_all(&base_dir)?;
        Ok(Self {
            config_path: base_dir.join(CONFIG_FILE),
            base_dir,
        })
    }

    /// `<data dir>/fintrack`, falling back to the home directory and then the
    /// working directory.
    pub fn default_base_dir() -> PathBuf {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .map_or_else(|| PathBuf::from("."), |dir| dir.join("fintrack"))
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(&self) -> Result<Config, ConfigError> {
        match fs::read_to_string(&self.config_path) {
            Ok(text) => serde_json::from_str(&text).map_err(invalid),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Config::default()),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes to a staging file next to the config, then renames it over the
    /// real one.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        let mut bytes = serde_json::to_vec_pretty(config).map_err(invalid)?;
        bytes.push(b'\n');

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.config_path.with_extension(STAGING_EXTENSION);
        {
            let mut file = File::create(&staging)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&staging, &self.config_path)?;
        Ok(())
    }

    pub fn data_file(&self, config: &Config) -> PathBuf {
        config.resolve_data_file(&self.base_dir)
    }
}

fn invalid(err: serde_json::Error) -> ConfigError {
    ConfigError::Serde(err.to_string())
}
