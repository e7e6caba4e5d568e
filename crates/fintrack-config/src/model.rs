use serde::{de::Deserializer, Deserialize, Serialize};
use std::{fmt, path::Path, path::PathBuf, time::Duration};

/// User-level configuration, stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default `tracing` directive; `RUST_LOG` still wins when set.
    #[serde(default = "Config::default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub categories: CategoryConfig,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Local JSON file backing the in-memory remote. Defaults to
    /// `<base>/data/ledger.json`.
    pub data_file: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_identity: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: Self::default_log_filter(),
            sync: SyncConfig::default(),
            categories: CategoryConfig::default(),
            data_file: None,
            last_identity: None,
        }
    }
}

impl Config {
    pub fn default_log_filter() -> String {
        "fintrack=info".into()
    }

    pub fn resolve_data_file(&self, base: &Path) -> PathBuf {
        match &self.data_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => base.join(path),
            None => base.join("data").join("ledger.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long a new subscription waits for the live feed before the
    /// one-shot fetch fallback.
    #[serde(default = "SyncConfig::default_cold_start_wait_ms")]
    pub cold_start_wait_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cold_start_wait_ms: Self::default_cold_start_wait_ms(),
        }
    }
}

impl SyncConfig {
    pub fn default_cold_start_wait_ms() -> u64 {
        1500
    }

    pub fn cold_start_wait(&self) -> Duration {
        Duration::from_millis(self.cold_start_wait_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryConfig {
    #[serde(default = "CategoryConfig::default_category_value")]
    pub default_category: String,
    #[serde(default)]
    pub scope: CategoryStoreScope,
}

impl Default for CategoryConfig {
    fn default() -> Self {
        Self {
            default_category: Self::default_category_value(),
            scope: CategoryStoreScope::default(),
        }
    }
}

impl CategoryConfig {
    pub fn default_category_value() -> String {
        "Other".into()
    }
}

/// Whether category documents are kept per user or shared by every user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStoreScope {
    #[default]
    Owner,
    Global,
}

impl CategoryStoreScope {
    pub fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "global" | "shared" => CategoryStoreScope::Global,
            _ => CategoryStoreScope::Owner,
        }
    }
}

impl fmt::Display for CategoryStoreScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryStoreScope::Owner => "owner",
            CategoryStoreScope::Global => "global",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for CategoryStoreScope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value
            .map(|raw| CategoryStoreScope::from_str(&raw))
            .unwrap_or_default())
    }
}
