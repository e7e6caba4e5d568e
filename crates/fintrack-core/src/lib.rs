//! fintrack-core
//!
//! Ledger synchronization, category registry and prediction services.
//! Depends on fintrack-domain. Remote stores and identity come in through the
//! traits in [`remote`]; no terminal I/O and no concrete storage here.

pub mod category_registry;
pub mod entry_form;
pub mod error;
pub mod ledger_store;
pub mod prediction;
pub mod remote;
pub mod session;
pub mod settings;
pub mod summary_service;
pub mod time;
pub mod tokenizer;

pub use category_registry::*;
pub use entry_form::*;
pub use error::{CoreError, CoreResult, RemoteError};
pub use ledger_store::*;
pub use prediction::*;
pub use remote::*;
pub use session::*;
pub use settings::SyncSettings;
pub use summary_service::*;
pub use time::{Clock, FixedClock, SystemClock};
pub use tokenizer::{tokenize, tokenize_str};

#[cfg(test)]
mod tests;
