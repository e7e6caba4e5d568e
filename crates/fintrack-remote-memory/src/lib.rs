//! fintrack-remote-memory
//!
//! In-process stand-ins for the remote collaborators: a transaction and
//! category store with owner-filtered live feeds, optionally mirrored to a
//! JSON file, and a locally driven identity provider.

pub mod error;
pub mod identity;
pub mod snapshot;
pub mod store;

pub use error::MemoryRemoteError;
pub use identity::LocalIdentityProvider;
pub use snapshot::{RemoteSnapshot, StoredCategory};
pub use store::{CategoryScope, MemoryRemote};
