#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, sync::Mutex, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use fintrack::Tracker;
use fintrack_core::{CategoryRegistry, LedgerSnapshot, LedgerStore, SyncSettings, SystemClock};
use fintrack_domain::{Identity, TransactionDraft, TransactionKind};
use fintrack_remote_memory::MemoryRemote;
use once_cell::sync::Lazy;
use tempfile::TempDir;
use tokio::{sync::watch, time};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Short cold-start wait so fallback paths run quickly.
pub fn fast_settings() -> SyncSettings {
    SyncSettings::default().with_cold_start_wait(Duration::from_millis(100))
}

pub fn alice() -> Identity {
    Identity::new("alice")
}

pub fn bob() -> Identity {
    Identity::new("bob")
}

pub fn day(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
}

pub fn expense(name: &str, amount: &str, category: &str) -> TransactionDraft {
    TransactionDraft::new(name, amount, TransactionKind::Expense, category)
}

pub fn expense_on(name: &str, amount: &str, category: &str, on: u32) -> TransactionDraft {
    expense(name, amount, category).with_timestamp(day(on))
}

pub fn ledger_over(remote: &Arc<MemoryRemote>) -> Arc<LedgerStore> {
    Arc::new(LedgerStore::new(
        remote.clone(),
        Arc::new(SystemClock),
        fast_settings(),
    ))
}

pub fn registry_over(remote: &Arc<MemoryRemote>, ledger: &Arc<LedgerStore>) -> CategoryRegistry {
    CategoryRegistry::new(remote.clone(), ledger.clone(), fast_settings())
}

pub fn tracker_over(remote: &Arc<MemoryRemote>) -> Tracker {
    Tracker::new(remote.clone(), remote.clone(), fast_settings())
}

/// Waits (bounded) until the projection satisfies `ready`.
pub async fn wait_for_ledger(
    rx: &mut watch::Receiver<LedgerSnapshot>,
    ready: impl FnMut(&LedgerSnapshot) -> bool,
) -> LedgerSnapshot {
    time::timeout(Duration::from_secs(5), rx.wait_for(ready))
        .await
        .expect("ledger reached the expected state in time")
        .expect("ledger store alive")
        .clone()
}
