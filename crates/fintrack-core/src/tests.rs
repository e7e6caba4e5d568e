use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::{
    ledger_store::normalize_records, summary_service::SummaryService, CoreError, FixedClock,
    LedgerPhase, LedgerStore, LiveFeed, RemoteError, SyncSettings, TransactionRemote,
};
use fintrack_domain::{
    Identity, RemoteTimestamp, Transaction, TransactionDraft, TransactionId, TransactionKind,
    TransactionRecord,
};

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, day, 9, 0, 0).unwrap()
}

fn expense(name: &str, category: &str, amount: f64) -> Transaction {
    Transaction::new(name, TransactionKind::Expense, category, amount, at(1))
}

fn income(name: &str, amount: f64) -> Transaction {
    Transaction::new(name, TransactionKind::Income, "Salary", amount, at(1))
}

fn record(id: &str, category: Option<&str>, date: RemoteTimestamp) -> TransactionRecord {
    TransactionRecord {
        id: Some(id.into()),
        user_id: Some("alice".into()),
        name: Some(id.into()),
        amount: 5.0,
        kind: None,
        category: category.map(str::to_string),
        note: None,
        date,
    }
}

#[test]
fn summary_totals_savings_and_ratio() {
    let transactions = vec![
        income("Pay", 3000.0),
        expense("Rent", "Bills", 1200.0),
        expense("Groceries", "Food", 300.0),
        expense("Pizza", "Food", 45.5),
    ];

    let summary = SummaryService::summarize(&transactions);

    assert_eq!(summary.total_income, 3000.0);
    assert_eq!(summary.total_expenses, 1545.5);
    assert_eq!(summary.savings, 1454.5);
    assert_eq!(summary.savings_ratio, 48.5);
    assert_eq!(summary.transaction_count, 4);
    let top = summary.highest_spending_category.expect("has expenses");
    assert_eq!(top.category, "Bills");
    assert_eq!(top.count, 1);
}

#[test]
fn summary_without_income_has_zero_ratio() {
    let summary = SummaryService::summarize(&[expense("Taxi", "Transport", 20.0)]);

    assert_eq!(summary.savings, -20.0);
    assert_eq!(summary.savings_ratio, 0.0);
}

#[test]
fn summary_of_empty_ledger() {
    let summary = SummaryService::summarize(&[]);

    assert_eq!(summary.total_income, 0.0);
    assert!(summary.highest_spending_category.is_none());
}

#[test]
fn totals_by_category_keep_first_seen_order() {
    let transactions = vec![
        expense("Bus", "Transport", 2.0),
        expense("Lunch", "Food", 10.0),
        income("Refund", 5.0),
        expense("Train", "Transport", 8.0),
    ];

    let totals = SummaryService::totals_by_category(&transactions);

    let names: Vec<&str> = totals.iter().map(|t| t.category.as_str()).collect();
    assert_eq!(names, ["Transport", "Food"]);
    assert_eq!(totals[0].amount, 10.0);
    assert_eq!(totals[0].count, 2);
}

#[test]
fn normalize_orders_most_recent_first_and_fills_defaults() {
    let records = vec![
        record("old", Some("Food"), RemoteTimestamp::Text("2025-05-01".into())),
        record("new", None, RemoteTimestamp::from_instant(at(20))),
        record("mid", Some(""), RemoteTimestamp::Millis(at(10).timestamp_millis())),
    ];

    let transactions = normalize_records(&records, "Other");

    let ids: Vec<&str> = transactions
        .iter()
        .filter_map(|t| t.id.as_ref().map(TransactionId::as_str))
        .collect();
    assert_eq!(ids, ["new", "mid", "old"]);
    assert_eq!(transactions[0].category, "Other");
    assert_eq!(transactions[1].category, "Other");
    assert_eq!(transactions[0].kind, TransactionKind::Expense);
}

#[test]
fn normalize_skips_unreadable_dates() {
    let records = vec![
        record("good", Some("Food"), RemoteTimestamp::from_instant(at(3))),
        record("bad", Some("Food"), RemoteTimestamp::Text("yesterday-ish".into())),
    ];

    let transactions = normalize_records(&records, "Other");

    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].name, "good");
}

#[test]
fn normalize_keeps_equal_timestamps_in_feed_order() {
    let same = RemoteTimestamp::from_instant(at(7));
    let records = vec![
        record("first", Some("A"), same.clone()),
        record("second", Some("B"), same),
    ];

    let transactions = normalize_records(&records, "Other");

    assert_eq!(transactions[0].name, "first");
    assert_eq!(transactions[1].name, "second");
}

/// Remote that counts calls and refuses everything.
#[derive(Default)]
struct CountingRemote {
    calls: AtomicUsize,
}

impl CountingRemote {
    fn hit(&self) -> RemoteError {
        self.calls.fetch_add(1, Ordering::SeqCst);
        RemoteError::Unavailable("offline".into())
    }
}

#[async_trait]
impl TransactionRemote for CountingRemote {
    async fn subscribe(&self, _owner: &Identity) -> Result<LiveFeed, RemoteError> {
        Err(self.hit())
    }

    async fn fetch_once(&self, _owner: &Identity) -> Result<Vec<TransactionRecord>, RemoteError> {
        Err(self.hit())
    }

    async fn create(
        &self,
        _owner: &Identity,
        _record: TransactionRecord,
    ) -> Result<TransactionId, RemoteError> {
        Err(self.hit())
    }

    async fn update(
        &self,
        _id: &TransactionId,
        _record: TransactionRecord,
    ) -> Result<(), RemoteError> {
        Err(self.hit())
    }

    async fn delete(&self, _id: &TransactionId) -> Result<(), RemoteError> {
        Err(self.hit())
    }

    async fn delete_by_category(
        &self,
        _owner: &Identity,
        _category: &str,
    ) -> Result<usize, RemoteError> {
        Err(self.hit())
    }
}

fn store(remote: &Arc<CountingRemote>) -> LedgerStore {
    LedgerStore::new(remote.clone(), Arc::new(FixedClock(at(15))), SyncSettings::default())
}

#[tokio::test]
async fn unbound_store_requires_sign_in() {
    let remote = Arc::new(CountingRemote::default());
    let store = store(&remote);

    let draft = TransactionDraft::new("Lunch", "12", TransactionKind::Expense, "Food");
    let err = store.add(draft).await.unwrap_err();

    assert!(matches!(err, CoreError::AuthRequired));
    assert_eq!(store.phase(), LedgerPhase::Unbound);
    assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_subscription_settles_empty() {
    let remote = Arc::new(CountingRemote::default());
    let store = store(&remote);

    let err = store.subscribe(Identity::new("alice")).await.unwrap_err();

    assert!(matches!(err, CoreError::RemoteRead(_)));
    assert_eq!(store.phase(), LedgerPhase::Ready);
    assert!(store.transactions().is_empty());
}

#[tokio::test]
async fn invalid_amount_never_reaches_the_remote() {
    let remote = Arc::new(CountingRemote::default());
    let store = store(&remote);
    let _ = store.subscribe(Identity::new("alice")).await;
    let before = remote.calls.load(Ordering::SeqCst);

    let draft = TransactionDraft::new("Lunch", "lots", TransactionKind::Expense, "Food");
    let err = store.add(draft).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(remote.calls.load(Ordering::SeqCst), before);
}

#[tokio::test]
async fn remote_failure_surfaces_as_write_error() {
    let remote = Arc::new(CountingRemote::default());
    let store = store(&remote);
    let _ = store.subscribe(Identity::new("alice")).await;

    let draft = TransactionDraft::new("Lunch", "12", TransactionKind::Expense, "Food");
    let err = store.add(draft).await.unwrap_err();

    assert!(matches!(err, CoreError::RemoteWrite(RemoteError::Unavailable(_))));
}

#[test]
fn remove_by_category_on_empty_projection_is_a_no_op() {
    let remote = Arc::new(CountingRemote::default());
    let store = store(&remote);
    let mut rx = store.watch();
    rx.borrow_and_update();

    assert_eq!(store.remove_by_category("Food"), 0);
    assert!(!rx.has_changed().unwrap());
    assert_eq!(remote.calls.load(Ordering::SeqCst), 0);
}
