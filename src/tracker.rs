//! High-level entry point over the ledger store, category registry and
//! session binder.
//!
//! Frontends (the CLI, tests) talk to [`Tracker`] instead of wiring the core
//! components themselves.

use std::{future::Future, sync::Arc, time::Duration};

use fintrack_core::{
    predict, CategoryRegistry, CategoryRemote, Clock, CoreError, CoreResult, DeletionReport,
    EntryForm, IdentityProvider, LedgerSnapshot, LedgerStore, LedgerSummary, PendingDeletion,
    Prediction, SessionBinder, SessionHandle, SummaryService, SyncSettings, SystemClock,
    TransactionRemote,
};
use fintrack_domain::{Identity, Transaction, TransactionId};
use tokio::{sync::watch, time};
use tracing::debug;

pub struct Tracker {
    ledger: Arc<LedgerStore>,
    registry: Arc<CategoryRegistry>,
    binder: Arc<SessionBinder>,
    settings: SyncSettings,
}

impl Tracker {
    pub fn new(
        transactions: Arc<dyn TransactionRemote>,
        categories: Arc<dyn CategoryRemote>,
        settings: SyncSettings,
    ) -> Self {
        Self::with_clock(transactions, categories, Arc::new(SystemClock), settings)
    }

    pub fn with_clock(
        transactions: Arc<dyn TransactionRemote>,
        categories: Arc<dyn CategoryRemote>,
        clock: Arc<dyn Clock>,
        settings: SyncSettings,
    ) -> Self {
        let ledger = Arc::new(LedgerStore::new(transactions, clock, settings.clone()));
        let registry = Arc::new(CategoryRegistry::new(
            categories,
            ledger.clone(),
            settings.clone(),
        ));
        let binder = Arc::new(SessionBinder::new(ledger.clone(), registry.clone()));
        Self {
            ledger,
            registry,
            binder,
            settings,
        }
    }

    pub fn ledger(&self) -> &Arc<LedgerStore> {
        &self.ledger
    }

    pub fn registry(&self) -> &Arc<CategoryRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn identity(&self) -> Option<Identity> {
        self.ledger.identity()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.snapshot()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.ledger.transactions()
    }

    pub fn categories(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Binds `identity` and waits until its ledger has settled.
    pub async fn sign_in(&self, identity: Identity) -> CoreResult<()> {
        self.binder.bind(Some(identity)).await?;
        self.ledger.wait_until_settled().await;
        Ok(())
    }

    pub async fn sign_out(&self) -> CoreResult<()> {
        self.binder.bind(None).await
    }

    /// Keeps the session bound to whatever `provider` reports.
    pub fn follow(&self, provider: Arc<dyn IdentityProvider>) -> SessionHandle {
        self.binder.spawn(provider)
    }

    /// Waits until both stores are bound to `expected` and loaded. Returns
    /// false when that does not happen within `within`.
    pub async fn wait_for_session(&self, expected: Option<&Identity>, within: Duration) -> bool {
        let mut ledger = self.ledger.watch();
        let mut categories = self.registry.watch();
        let reached = time::timeout(within, async {
            let ledger_ready = ledger
                .wait_for(|snapshot| snapshot.identity() == expected && !snapshot.is_loading())
                .await
                .is_ok();
            if !ledger_ready {
                return false;
            }
            categories
                .wait_for(|snapshot| {
                    snapshot.identity() == expected && (expected.is_none() || snapshot.is_loaded())
                })
                .await
                .is_ok()
        })
        .await;
        matches!(reached, Ok(true))
    }

    pub fn new_form(&self) -> EntryForm {
        EntryForm::new(self.registry.default_category())
    }

    pub fn edit_form(&self, id: &TransactionId) -> CoreResult<EntryForm> {
        self.ledger
            .snapshot()
            .get(id)
            .map(EntryForm::edit)
            .ok_or_else(|| CoreError::TransactionNotFound(id.clone()))
    }

    /// Runs the predictor over the current ledger and category names.
    pub fn suggest_category(&self, input: &str) -> Prediction {
        let snapshot = self.ledger.snapshot();
        let categories = self.registry.names();
        predict(Some(input), snapshot.transactions(), &categories)
    }

    /// Feeds a name change into `form` using the current ledger state.
    pub fn update_form_name(&self, form: &mut EntryForm, name: &str) -> Prediction {
        let snapshot = self.ledger.snapshot();
        let categories = self.registry.names();
        form.on_name_changed(name, snapshot.transactions(), &categories)
            .clone()
    }

    /// Saves the form as a new transaction or a full replacement of the one
    /// being edited. The category is created first when it does not exist
    /// yet. Returns once the live feed reflects the write, or after the
    /// cold-start wait at most.
    pub async fn save(&self, form: EntryForm) -> CoreResult<TransactionId> {
        let editing = form.editing().cloned();
        let draft = form.into_draft()?;
        self.registry.ensure(&draft.category).await?;
        self.synced(async {
            match editing {
                Some(id) => self.ledger.edit(&id, draft).await.map(|_| id),
                None => self.ledger.add(draft).await,
            }
        })
        .await
    }

    pub async fn remove(&self, id: &TransactionId) -> CoreResult<()> {
        self.synced(self.ledger.remove(id)).await
    }

    pub async fn add_category(&self, name: &str) -> CoreResult<String> {
        self.registry.add(name).await
    }

    pub fn request_category_deletion(&self, name: &str) -> CoreResult<PendingDeletion> {
        self.registry.request_delete(name)
    }

    pub async fn delete_category(&self, confirmed: PendingDeletion) -> CoreResult<DeletionReport> {
        self.registry.delete(confirmed).await
    }

    pub fn summary(&self) -> LedgerSummary {
        SummaryService::summarize(self.ledger.snapshot().transactions())
    }

    async fn synced<T>(&self, write: impl Future<Output = CoreResult<T>>) -> CoreResult<T> {
        let mut rx: watch::Receiver<LedgerSnapshot> = self.ledger.watch();
        rx.borrow_and_update();
        let value = write.await?;
        if time::timeout(self.settings.cold_start_wait, rx.changed())
            .await
            .is_err()
        {
            debug!("live feed has not reported the write yet");
        }
        Ok(value)
    }
}
