use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryRemoteError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
}
