//! fintrack ties the workspace crates together: tracing bootstrap, the
//! [`Tracker`] facade over the ledger and category stores, and the
//! `fintrack_cli` shell.

pub mod bootstrap;
pub mod cli;
pub mod tracker;
pub mod utils;

pub use bootstrap::{open_workspace, sync_settings, BootstrapError, Workspace};
pub use tracker::Tracker;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default filter and emits a startup log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("fintrack tracing initialized.");
    });
}
