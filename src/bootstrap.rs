//! Builds a ready-to-use tracker from the on-disk configuration.

use std::{path::PathBuf, sync::Arc};

use fintrack_config::{CategoryStoreScope, Config, ConfigError, ConfigManager};
use fintrack_core::SyncSettings;
use fintrack_remote_memory::{CategoryScope, MemoryRemote, MemoryRemoteError};
use thiserror::Error;
use tracing::info;

use crate::Tracker;

/// Overrides the base directory holding config and data.
pub const HOME_ENV: &str = "FINTRACK_HOME";

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Remote(#[from] MemoryRemoteError),
}

/// Everything a frontend needs: persisted config plus a tracker wired to the
/// local document store.
pub struct Workspace {
    pub config_manager: ConfigManager,
    pub config: Config,
    pub remote: Arc<MemoryRemote>,
    pub tracker: Tracker,
}

impl Workspace {
    pub fn save_config(&self) -> Result<(), ConfigError> {
        self.config_manager.save(&self.config)
    }
}

pub fn base_dir_from_env() -> PathBuf {
    std::env::var_os(HOME_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(ConfigManager::default_base_dir)
}

pub fn sync_settings(config: &Config) -> SyncSettings {
    SyncSettings {
        cold_start_wait: config.sync.cold_start_wait(),
        default_category: config.categories.default_category.clone(),
    }
}

pub fn category_scope(config: &Config) -> CategoryScope {
    match config.categories.scope {
        CategoryStoreScope::Owner => CategoryScope::Owner,
        CategoryStoreScope::Global => CategoryScope::Global,
    }
}

/// Loads the config under `base` and opens the document store it points at.
pub fn open_workspace(base: PathBuf) -> Result<Workspace, BootstrapError> {
    let config_manager = ConfigManager::with_base_dir(base)?;
    let config = config_manager.load()?;
    let data_file = config_manager.data_file(&config);
    let remote = Arc::new(MemoryRemote::open(&data_file)?.with_scope(category_scope(&config)));
    info!(data_file = %data_file.display(), scope = %config.categories.scope, "workspace opened");

    let tracker = Tracker::new(remote.clone(), remote.clone(), sync_settings(&config));
    Ok(Workspace {
        config_manager,
        config,
        remote,
        tracker,
    })
}
