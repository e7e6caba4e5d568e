//! fintrack-config
//!
//! Persistent preferences for the tracker: log filter, sync tuning, category
//! defaults and where the local data file lives.

pub mod error;
pub mod manager;
pub mod model;

pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::{CategoryConfig, CategoryStoreScope, Config, SyncConfig};
