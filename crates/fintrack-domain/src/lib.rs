//! fintrack-domain
//!
//! Pure domain models (Identity, Transaction, wire records, categories).
//! No I/O, no async, no storage. Only data types, conversions and core enums.

pub mod category;
pub mod common;
pub mod identity;
pub mod record;
pub mod transaction;

pub use category::*;
pub use common::*;
pub use identity::*;
pub use record::*;
pub use transaction::*;
