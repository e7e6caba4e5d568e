use std::time::Duration;

use fintrack_domain::DEFAULT_CATEGORY;

/// Tunables shared by the ledger store and the category registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// How long a fresh subscription waits for the live feed before falling
    /// back to a one-shot fetch.
    pub cold_start_wait: Duration,
    pub default_category: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            cold_start_wait: Duration::from_millis(1500),
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl SyncSettings {
    pub fn with_cold_start_wait(mut self, wait: Duration) -> Self {
        self.cold_start_wait = wait;
        self
    }
}
