mod common;

use std::sync::Arc;

use common::*;
use fintrack_core::{CategoryRemote, CoreError, Prediction, PredictionTier};
use fintrack_domain::{TransactionId, TransactionKind};
use fintrack_remote_memory::MemoryRemote;

#[tokio::test]
async fn save_uses_the_predicted_category_and_creates_it() {
    let remote = Arc::new(MemoryRemote::new());
    let tracker = tracker_over(&remote);
    tracker.sign_in(alice()).await.expect("sign in");
    let mut rx = tracker.ledger().watch();

    let mut form = tracker.new_form();
    let prediction = tracker.update_form_name(&mut form, "Uber to the airport");
    form.amount = "32.50".into();
    let id = tracker.save(form).await.expect("save");

    assert_eq!(prediction.tier(), Some(PredictionTier::DefaultKeywords));
    let snapshot = wait_for_ledger(&mut rx, |s| s.get(&id).is_some()).await;
    let saved = snapshot.get(&id).expect("saved");
    assert_eq!(saved.category, "Transport");
    assert_eq!(saved.amount, 32.5);
    assert_eq!(tracker.categories(), ["Other", "Transport"]);
    assert_eq!(remote.list(&alice()).await.expect("list").len(), 2);
}

#[tokio::test]
async fn explicit_category_wins_over_the_prediction() {
    let remote = Arc::new(MemoryRemote::new());
    let tracker = tracker_over(&remote);
    tracker.sign_in(alice()).await.expect("sign in");
    let mut rx = tracker.ledger().watch();

    let mut form = tracker.new_form();
    form.select_category("Treats");
    tracker.update_form_name(&mut form, "pizza night");
    form.amount = "20".into();
    let id = tracker.save(form).await.expect("save");

    let snapshot = wait_for_ledger(&mut rx, |s| s.get(&id).is_some()).await;
    assert_eq!(snapshot.get(&id).expect("saved").category, "Treats");
    assert!(tracker.categories().contains(&"Treats".to_string()));
}

#[tokio::test]
async fn history_drives_suggestions_once_there_is_enough() {
    let remote = Arc::new(MemoryRemote::new());
    let tracker = tracker_over(&remote);
    tracker.sign_in(alice()).await.expect("sign in");
    let mut rx = tracker.ledger().watch();

    for idx in 0..5 {
        tracker
            .ledger()
            .add(expense_on(&format!("Coffee {idx}"), "3", "Treats", idx + 1))
            .await
            .expect("add");
    }
    wait_for_ledger(&mut rx, |s| s.transactions().len() == 5).await;

    assert_eq!(
        tracker.suggest_category("coffee"),
        Prediction::Suggested {
            category: "Treats".into(),
            tier: PredictionTier::History,
        }
    );
    assert_eq!(tracker.suggest_category("qwerty"), Prediction::NoSuggestion);
}

#[tokio::test]
async fn edit_form_round_trips_through_save() {
    let remote = Arc::new(MemoryRemote::new());
    let tracker = tracker_over(&remote);
    tracker.sign_in(alice()).await.expect("sign in");
    let mut rx = tracker.ledger().watch();

    let id = tracker
        .ledger()
        .add(expense_on("Gym", "40", "Other", 2))
        .await
        .expect("add");
    wait_for_ledger(&mut rx, |s| s.get(&id).is_some()).await;

    let mut form = tracker.edit_form(&id).expect("form");
    assert_eq!(form.editing(), Some(&id));
    form.amount = "45".into();
    form.kind = TransactionKind::Expense;
    let saved_id = tracker.save(form).await.expect("save");

    assert_eq!(saved_id, id);
    let snapshot = wait_for_ledger(&mut rx, |s| {
        s.get(&id).is_some_and(|txn| txn.amount == 45.0)
    })
    .await;
    assert_eq!(snapshot.transactions().len(), 1);
    assert_eq!(snapshot.get(&id).expect("edited").category, "Other");
}

#[tokio::test]
async fn edit_form_for_an_unknown_id_fails() {
    let remote = Arc::new(MemoryRemote::new());
    let tracker = tracker_over(&remote);
    tracker.sign_in(alice()).await.expect("sign in");

    let err = tracker.edit_form(&TransactionId::new("nope")).unwrap_err();
    assert!(matches!(err, CoreError::TransactionNotFound(_)));
}

#[tokio::test]
async fn summary_reflects_the_ledger() {
    let remote = Arc::new(MemoryRemote::new());
    let tracker = tracker_over(&remote);
    tracker.sign_in(alice()).await.expect("sign in");
    let mut rx = tracker.ledger().watch();

    let ledger = tracker.ledger();
    ledger
        .add(
            fintrack_domain::TransactionDraft::new("Pay", "2000", TransactionKind::Income, "Salary")
                .with_timestamp(day(1)),
        )
        .await
        .expect("add");
    ledger.add(expense_on("Rent", "900", "Bills", 2)).await.expect("add");
    ledger.add(expense_on("Pizza", "100", "Food", 3)).await.expect("add");
    wait_for_ledger(&mut rx, |s| s.transactions().len() == 3).await;

    let summary = tracker.summary();

    assert_eq!(summary.total_income, 2000.0);
    assert_eq!(summary.total_expenses, 1000.0);
    assert_eq!(summary.savings, 1000.0);
    assert_eq!(summary.savings_ratio, 50.0);
    assert_eq!(
        summary.highest_spending_category.expect("expenses").category,
        "Bills"
    );
}

#[tokio::test]
async fn writes_require_a_session() {
    let remote = Arc::new(MemoryRemote::new());
    let tracker = tracker_over(&remote);

    let mut form = tracker.new_form();
    form.name = "Lunch".into();
    form.amount = "10".into();

    assert!(matches!(
        tracker.save(form).await,
        Err(CoreError::AuthRequired)
    ));
    assert_eq!(remote.write_count(), 0);
}
