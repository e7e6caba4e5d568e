//! JSON mirror of the in-memory documents.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use fintrack_domain::TransactionRecord;
use serde::{Deserialize, Serialize};

use crate::MemoryRemoteError;

pub const SNAPSHOT_VERSION: u32 = 1;
const TMP_SUFFIX: &str = "tmp";

/// A category document. `owner` is empty for globally shared categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteSnapshot {
    pub version: u32,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub categories: Vec<StoredCategory>,
}

impl Default for RemoteSnapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            transactions: Vec::new(),
            categories: Vec::new(),
        }
    }
}

impl RemoteSnapshot {
    /// Reads a snapshot file. A missing file is an empty store.
    pub fn load_from_path(path: &Path) -> Result<Self, MemoryRemoteError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        let snapshot: RemoteSnapshot =
            serde_json::from_str(&data).map_err(|err| MemoryRemoteError::Serde(err.to_string()))?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(MemoryRemoteError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }

    /// Writes through a sibling temp file and renames it into place.
    pub fn save_to_path(&self, path: &Path) -> Result<(), MemoryRemoteError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|err| MemoryRemoteError::Serde(err.to_string()))?;
        let tmp = tmp_path(path);
        let mut file = File::create(&tmp)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{existing}.{TMP_SUFFIX}"),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
