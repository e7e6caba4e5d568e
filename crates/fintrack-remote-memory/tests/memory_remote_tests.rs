use chrono::{TimeZone, Utc};
use fintrack_core::{CategoryRemote, IdentityProvider, RemoteError, TransactionRemote};
use fintrack_domain::{CategoryRecord, Identity, RemoteTimestamp, TransactionId, TransactionRecord};
use fintrack_remote_memory::{CategoryScope, LocalIdentityProvider, MemoryRemote};
use tempfile::tempdir;

fn record(name: &str, category: &str) -> TransactionRecord {
    TransactionRecord {
        id: None,
        user_id: None,
        name: Some(name.into()),
        amount: 12.0,
        kind: None,
        category: Some(category.into()),
        note: None,
        date: RemoteTimestamp::from_instant(Utc.with_ymd_and_hms(2025, 4, 2, 10, 0, 0).unwrap()),
    }
}

fn alice() -> Identity {
    Identity::new("alice")
}

fn bob() -> Identity {
    Identity::new("bob")
}

#[tokio::test]
async fn feed_starts_with_current_documents_and_follows_writes() {
    let remote = MemoryRemote::new();
    remote.create(&alice(), record("Lunch", "Food")).await.expect("create");

    let mut feed = remote.subscribe(&alice()).await.expect("subscribe");
    let first = feed.next().await.expect("initial snapshot");
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].user_id.as_deref(), Some("alice"));

    remote.create(&alice(), record("Taxi", "Transport")).await.expect("create");
    let second = feed.next().await.expect("second snapshot");
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn feeds_are_filtered_by_owner() {
    let remote = MemoryRemote::new();
    let mut feed = remote.subscribe(&alice()).await.expect("subscribe");
    assert!(feed.next().await.expect("initial").is_empty());

    remote.create(&bob(), record("Rent", "Bills")).await.expect("create");

    assert!(remote.fetch_once(&alice()).await.expect("fetch").is_empty());
    assert_eq!(remote.fetch_once(&bob()).await.expect("fetch").len(), 1);
    assert_eq!(remote.open_feeds(&alice()), 1);
}

#[tokio::test]
async fn update_and_delete_report_missing_documents() {
    let remote = MemoryRemote::new();
    let missing = TransactionId::new("nope");

    let err = remote.update(&missing, record("x", "y")).await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(_)));

    let err = TransactionRemote::delete(&remote, &missing).await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(_)));
}

#[tokio::test]
async fn update_keeps_the_owner() {
    let remote = MemoryRemote::new();
    let id = remote.create(&alice(), record("Lunch", "Food")).await.expect("create");

    remote.update(&id, record("Brunch", "Food")).await.expect("update");

    let docs = remote.transactions_of(&alice());
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].name.as_deref(), Some("Brunch"));
    assert_eq!(docs[0].id.as_deref(), Some(id.as_str()));
}

#[tokio::test]
async fn delete_by_category_only_touches_the_owner() {
    let remote = MemoryRemote::new();
    remote.create(&alice(), record("Bus", "Transport")).await.expect("create");
    remote.create(&alice(), record("Taxi", "Transport")).await.expect("create");
    remote.create(&alice(), record("Pizza", "Food")).await.expect("create");
    remote.create(&bob(), record("Train", "Transport")).await.expect("create");

    let removed = remote
        .delete_by_category(&alice(), "Transport")
        .await
        .expect("purge");

    assert_eq!(removed, 2);
    assert_eq!(remote.transactions_of(&alice()).len(), 1);
    assert_eq!(remote.transactions_of(&bob()).len(), 1);
}

#[tokio::test]
async fn injected_failures_count_as_writes() {
    let remote = MemoryRemote::new();
    remote.fail_next_write();

    let err = remote.create(&alice(), record("Lunch", "Food")).await.unwrap_err();
    assert!(matches!(err, RemoteError::Unavailable(_)));
    remote.create(&alice(), record("Lunch", "Food")).await.expect("second try");

    assert_eq!(remote.write_count(), 2);
    assert_eq!(remote.transactions_of(&alice()).len(), 1);
}

#[tokio::test]
async fn owner_scoped_categories_are_private() {
    let remote = MemoryRemote::new();
    remote.insert(&alice(), CategoryRecord::new("Food")).await.expect("insert");
    remote.insert(&bob(), CategoryRecord::new("Food")).await.expect("insert");

    let removed = CategoryRemote::delete(&remote, &alice(), "Food").await.expect("delete");

    assert_eq!(removed, 1);
    assert!(remote.list(&alice()).await.expect("list").is_empty());
    assert_eq!(remote.list(&bob()).await.expect("list").len(), 1);
}

#[tokio::test]
async fn global_categories_are_shared() {
    let remote = MemoryRemote::new().with_scope(CategoryScope::Global);
    remote.insert(&alice(), CategoryRecord::new("Food")).await.expect("insert");

    let names: Vec<String> = remote
        .list(&bob())
        .await
        .expect("list")
        .into_iter()
        .map(|c| c.name)
        .collect();

    assert_eq!(names, ["Food"]);
}

#[tokio::test]
async fn open_mirrors_writes_to_disk() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("data").join("ledger.json");

    {
        let remote = MemoryRemote::open(&path).expect("open");
        remote.create(&alice(), record("Lunch", "Food")).await.expect("create");
        remote.insert(&alice(), CategoryRecord::new("Food")).await.expect("insert");
    }

    let reopened = MemoryRemote::open(&path).expect("reopen");
    assert_eq!(reopened.transactions_of(&alice()).len(), 1);
    assert_eq!(reopened.list(&alice()).await.expect("list").len(), 1);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn local_identity_provider_publishes_changes() {
    let provider = LocalIdentityProvider::default();
    let mut changes = provider.changes();
    assert!(provider.current().is_none());

    provider.sign_in(alice());
    assert!(changes.has_changed().expect("sender alive"));
    assert_eq!(changes.borrow_and_update().clone(), Some(alice()));

    provider.sign_out();
    assert_eq!(provider.current(), None);
}

#[tokio::test]
async fn suppressed_feeds_go_live_when_suppression_lifts() {
    let remote = MemoryRemote::new();
    remote.create(&alice(), record("Lunch", "Food")).await.expect("create");
    remote.suppress_feeds(true);

    let mut feed = remote.subscribe(&alice()).await.expect("subscribe");
    let dropped = remote.subscribe(&alice()).await.expect("subscribe");
    drop(dropped);
    let quiet = tokio::time::timeout(std::time::Duration::from_millis(50), feed.next()).await;
    assert!(quiet.is_err(), "suppressed feed delivered a snapshot");
    assert_eq!(remote.open_feeds(&alice()), 0);

    remote.create(&alice(), record("Taxi", "Transport")).await.expect("create");
    remote.suppress_feeds(false);

    let first = feed.next().await.expect("snapshot after lifting");
    assert_eq!(first.len(), 2);
    assert_eq!(remote.open_feeds(&alice()), 1);

    remote.create(&alice(), record("Bus", "Transport")).await.expect("create");
    assert_eq!(feed.next().await.expect("live snapshot").len(), 3);
}

#[tokio::test]
async fn purge_failures_only_hit_bulk_deletes() {
    let remote = MemoryRemote::new();
    remote.create(&alice(), record("Taxi", "Transport")).await.expect("create");
    remote.fail_purges(true);

    let err = remote
        .delete_by_category(&alice(), "Transport")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Unavailable(_)));
    remote.insert(&alice(), CategoryRecord::new("Food")).await.expect("insert");
    assert_eq!(remote.transactions_of(&alice()).len(), 1);

    remote.fail_purges(false);
    assert_eq!(
        remote.delete_by_category(&alice(), "Transport").await.expect("purge"),
        1
    );
}
