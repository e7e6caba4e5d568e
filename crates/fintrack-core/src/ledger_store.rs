//! Reactive projection of the bound identity's transactions.
//!
//! The projection lives in a `watch` channel; observers hold receivers and
//! unsubscribe by dropping them. Remote mutators (`add`, `edit`, `remove`)
//! wait for the remote store and never touch the projection: it changes only
//! when the live feed delivers the next snapshot. `remove_by_category` is the
//! one optimistic operation and filters the projection immediately.
//!
//! A category cascade hides the category's rows until the feed stops
//! reporting them, so a snapshot taken before the remote purge cannot bring
//! them back.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex, PoisonError},
};

use async_trait::async_trait;
use fintrack_domain::{Identity, Transaction, TransactionDraft, TransactionId, TransactionRecord};
use tokio::{sync::watch, task::JoinHandle, time};
use tracing::{debug, error, info, warn};

use crate::{
    category_registry::CategoryCascade, Clock, CoreError, CoreResult, LiveFeed, RemoteError,
    SyncSettings, TransactionRemote,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerPhase {
    /// No identity bound.
    Unbound,
    /// Subscribed, first snapshot not seen yet.
    Loading,
    /// At least one snapshot applied, possibly empty.
    Ready,
}

/// Rows dropped by a category cascade, kept out of feed snapshots.
#[derive(Debug, Clone)]
struct PendingPurge {
    ids: HashSet<TransactionId>,
    /// Remote documents are gone. Only stale copies of `ids` stay hidden,
    /// until a snapshot without any of them lands.
    settled: bool,
}

impl PendingPurge {
    fn hides(&self, category: &str, txn: &Transaction) -> bool {
        if self.settled {
            txn.id.as_ref().is_some_and(|id| self.ids.contains(id))
        } else {
            txn.category == category
        }
    }
}

/// Ordered view of the ledger at one point in time, most recent first.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    identity: Option<Identity>,
    phase: LedgerPhase,
    transactions: Vec<Transaction>,
    epoch: u64,
    purges: HashMap<String, PendingPurge>,
}

impl LedgerSnapshot {
    fn unbound(epoch: u64) -> Self {
        Self {
            identity: None,
            phase: LedgerPhase::Unbound,
            transactions: Vec::new(),
            epoch,
            purges: HashMap::new(),
        }
    }

    fn loading(identity: Identity, epoch: u64) -> Self {
        Self {
            identity: Some(identity),
            phase: LedgerPhase::Loading,
            ..Self::unbound(epoch)
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn phase(&self) -> LedgerPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LedgerPhase::Loading
    }

    pub fn is_ready(&self) -> bool {
        self.phase == LedgerPhase::Ready
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn into_transactions(self) -> Vec<Transaction> {
        self.transactions
    }

    pub fn get(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|txn| txn.id.as_ref() == Some(id))
    }

    pub fn count_in_category(&self, category: &str) -> usize {
        self.transactions
            .iter()
            .filter(|txn| txn.category == category)
            .count()
    }
}

#[derive(Default)]
struct FeedSlot {
    epoch: u64,
    task: Option<JoinHandle<()>>,
}

pub struct LedgerStore {
    remote: Arc<dyn TransactionRemote>,
    clock: Arc<dyn Clock>,
    settings: SyncSettings,
    state: Arc<watch::Sender<LedgerSnapshot>>,
    feed: Mutex<FeedSlot>,
}

impl LedgerStore {
    pub fn new(
        remote: Arc<dyn TransactionRemote>,
        clock: Arc<dyn Clock>,
        settings: SyncSettings,
    ) -> Self {
        let (state, _) = watch::channel(LedgerSnapshot::unbound(0));
        Self {
            remote,
            clock,
            settings,
            state: Arc::new(state),
            feed: Mutex::new(FeedSlot::default()),
        }
    }

    /// New observer of the projection. Dropping the receiver unsubscribes.
    pub fn watch(&self) -> watch::Receiver<LedgerSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state.borrow().clone()
    }

    pub fn transactions(&self) -> Vec<Transaction> {
        self.state.borrow().transactions.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity.clone()
    }

    pub fn phase(&self) -> LedgerPhase {
        self.state.borrow().phase
    }

    /// Waits until the store leaves `Loading`.
    pub async fn wait_until_settled(&self) -> LedgerSnapshot {
        let mut rx = self.watch();
        let settled = rx.wait_for(|snapshot| snapshot.phase != LedgerPhase::Loading).await;
        match settled {
            Ok(snapshot) => snapshot.clone(),
            // The sender lives as long as `self`.
            Err(_) => self.snapshot(),
        }
    }

    /// Opens the live feed for `identity`, tearing down any previous feed
    /// first. The store moves `Unbound → Loading` immediately and to `Ready`
    /// once the first snapshot (or the cold-start fallback) lands.
    pub async fn subscribe(&self, identity: Identity) -> CoreResult<()> {
        let epoch = self.rebind(Some(identity.clone()));
        info!(identity = %identity, epoch, "subscribing to ledger feed");

        let feed = match self.remote.subscribe(&identity).await {
            Ok(feed) => feed,
            Err(err) => {
                error!(identity = %identity, "ledger subscription failed: {err}");
                mark_ready(&self.state, epoch);
                return Err(CoreError::RemoteRead(err));
            }
        };

        let mut slot = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.epoch != epoch {
            debug!(identity = %identity, "subscription superseded before the feed opened");
            return Ok(());
        }
        let pump = FeedPump {
            state: Arc::clone(&self.state),
            remote: Arc::clone(&self.remote),
            settings: self.settings.clone(),
            identity,
            epoch,
        };
        slot.task = Some(tokio::spawn(pump.run(feed)));
        Ok(())
    }

    /// Cancels the live feed and clears the projection.
    pub fn unbind(&self) {
        let epoch = self.rebind(None);
        debug!(epoch, "ledger store unbound");
    }

    /// Writes a new transaction and waits for the remote to accept it. The
    /// projection is refreshed by the live feed, not here.
    pub async fn add(&self, draft: TransactionDraft) -> CoreResult<TransactionId> {
        let identity = self.require_identity()?;
        let txn = draft.into_transaction(self.clock.now())?;
        let mut record = TransactionRecord::from_transaction(&txn);
        record.user_id = Some(identity.as_str().to_string());

        let id = self
            .remote
            .create(&identity, record)
            .await
            .map_err(CoreError::RemoteWrite)?;
        info!(identity = %identity, id = %id, "transaction added");
        Ok(id)
    }

    /// Replaces every field of an existing transaction.
    pub async fn edit(&self, id: &TransactionId, draft: TransactionDraft) -> CoreResult<()> {
        let identity = self.require_identity()?;
        let txn = draft.into_transaction(self.clock.now())?.with_id(id.clone());
        let mut record = TransactionRecord::from_transaction(&txn);
        record.user_id = Some(identity.as_str().to_string());

        self.remote
            .update(id, record)
            .await
            .map_err(|err| write_error(id, err))?;
        info!(identity = %identity, id = %id, "transaction replaced");
        Ok(())
    }

    pub async fn remove(&self, id: &TransactionId) -> CoreResult<()> {
        let identity = self.require_identity()?;
        self.remote
            .delete(id)
            .await
            .map_err(|err| write_error(id, err))?;
        info!(identity = %identity, id = %id, "transaction removed");
        Ok(())
    }

    /// Local-only: drops every projected transaction in `category` right away,
    /// without any remote acknowledgment. Returns how many entries were dropped;
    /// zero leaves the projection (and its observers) untouched.
    pub fn remove_by_category(&self, category: &str) -> usize {
        self.take_category(category, None).len()
    }

    /// Removes the category's rows from the projection and hands them back.
    /// With `purge_epoch` set, the category is also hidden from feed
    /// snapshots of that epoch until the purge is settled.
    fn take_category(&self, category: &str, purge_epoch: Option<u64>) -> Vec<Transaction> {
        let mut taken = Vec::new();
        self.state.send_if_modified(|snapshot| {
            let (dropped, kept): (Vec<Transaction>, Vec<Transaction>) =
                std::mem::take(&mut snapshot.transactions)
                    .into_iter()
                    .partition(|txn| txn.category == category);
            snapshot.transactions = kept;
            if purge_epoch.is_some_and(|epoch| epoch == snapshot.epoch) {
                let purge = PendingPurge {
                    ids: dropped.iter().filter_map(|txn| txn.id.clone()).collect(),
                    settled: false,
                };
                snapshot.purges.insert(category.to_string(), purge);
            }
            taken = dropped;
            !taken.is_empty()
        });
        if !taken.is_empty() {
            info!(category, removed = taken.len(), "dropped transactions from local projection");
        }
        taken
    }

    fn require_identity(&self) -> CoreResult<Identity> {
        self.identity().ok_or(CoreError::AuthRequired)
    }

    fn rebind(&self, identity: Option<Identity>) -> u64 {
        let mut slot = self.feed.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.task.take() {
            task.abort();
        }
        slot.epoch += 1;
        let epoch = slot.epoch;
        self.state.send_replace(LedgerSnapshot::unbound(epoch));
        if let Some(identity) = identity {
            self.state.send_replace(LedgerSnapshot::loading(identity, epoch));
        }
        epoch
    }
}

#[async_trait]
impl CategoryCascade for LedgerStore {
    /// Drops the category locally right away, then waits for the remote
    /// purge. On failure the dropped rows are put back and the error is
    /// returned.
    async fn cascade_delete(&self, category: &str) -> CoreResult<usize> {
        let identity = self.require_identity()?;
        let epoch = self.state.borrow().epoch;
        let taken = self.take_category(category, Some(epoch));
        let removed = taken.len();

        match self.remote.delete_by_category(&identity, category).await {
            Ok(purged) => {
                debug!(category, purged, "remote purge finished");
                settle_purge(&self.state, epoch, category);
                Ok(removed)
            }
            Err(err) => {
                error!(category, "remote purge failed: {err}");
                restore_category(&self.state, epoch, category, taken);
                Err(CoreError::RemoteWrite(err))
            }
        }
    }

    fn count_in_category(&self, category: &str) -> usize {
        self.state.borrow().count_in_category(category)
    }
}

impl Drop for LedgerStore {
    fn drop(&mut self) {
        let slot = self.feed.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(task) = slot.task.take() {
            task.abort();
        }
    }
}

fn write_error(id: &TransactionId, err: RemoteError) -> CoreError {
    match err {
        RemoteError::NotFound(_) => CoreError::TransactionNotFound(id.clone()),
        other => CoreError::RemoteWrite(other),
    }
}

/// Owns one live feed for one bind epoch.
struct FeedPump {
    state: Arc<watch::Sender<LedgerSnapshot>>,
    remote: Arc<dyn TransactionRemote>,
    settings: SyncSettings,
    identity: Identity,
    epoch: u64,
}

impl FeedPump {
    async fn run(self, mut feed: LiveFeed) {
        let first = time::timeout(self.settings.cold_start_wait, feed.next()).await;
        let feed_open = match first {
            Ok(Some(records)) => {
                self.apply(records);
                true
            }
            Ok(None) => {
                self.cold_start(None).await;
                false
            }
            Err(_) => self.cold_start(Some(&mut feed)).await,
        };

        if feed_open {
            while let Some(records) = feed.next().await {
                if !self.apply(records) && self.is_stale() {
                    break;
                }
            }
        }
        debug!(identity = %self.identity, epoch = self.epoch, "ledger feed closed");
    }

    /// One-shot fetch for a feed that has reported nothing. If the live feed
    /// speaks while the fetch is in flight, the fetch result is discarded.
    /// Returns whether the feed is still open.
    async fn cold_start(&self, feed: Option<&mut LiveFeed>) -> bool {
        warn!(
            identity = %self.identity,
            wait_ms = self.settings.cold_start_wait.as_millis() as u64,
            "no live snapshot yet, falling back to a one-shot fetch"
        );
        let fetched = match feed {
            Some(feed) => {
                tokio::select! {
                    biased;
                    live = feed.next() => match live {
                        Some(records) => {
                            self.apply(records);
                            return true;
                        }
                        None => self.remote.fetch_once(&self.identity).await,
                    },
                    fetched = self.remote.fetch_once(&self.identity) => {
                        self.handle_fetch(fetched);
                        return true;
                    }
                }
            }
            None => self.remote.fetch_once(&self.identity).await,
        };
        self.handle_fetch(fetched);
        false
    }

    fn handle_fetch(&self, fetched: Result<Vec<TransactionRecord>, RemoteError>) {
        match fetched {
            Ok(records) => {
                self.apply(records);
            }
            Err(err) => {
                warn!(identity = %self.identity, "one-shot fetch failed: {err}");
                mark_ready(&self.state, self.epoch);
            }
        }
    }

    fn apply(&self, records: Vec<TransactionRecord>) -> bool {
        let transactions = normalize_records(&records, &self.settings.default_category);
        let epoch = self.epoch;
        let applied = self.state.send_if_modified(move |snapshot| {
            if snapshot.epoch != epoch {
                return false;
            }
            let mut transactions = transactions;
            if !snapshot.purges.is_empty() {
                snapshot.purges.retain(|category, purge| {
                    !purge.settled || transactions.iter().any(|txn| purge.hides(category, txn))
                });
                let purges = &snapshot.purges;
                transactions.retain(|txn| {
                    !purges
                        .iter()
                        .any(|(category, purge)| purge.hides(category, txn))
                });
            }
            snapshot.transactions = transactions;
            snapshot.phase = LedgerPhase::Ready;
            true
        });
        if applied {
            debug!(identity = %self.identity, count = records.len(), "applied ledger snapshot");
        }
        applied
    }

    fn is_stale(&self) -> bool {
        self.state.borrow().epoch != self.epoch
    }
}

/// Normalizes remote documents and orders them most recent first. Documents
/// whose date cannot be read are left out.
pub fn normalize_records(records: &[TransactionRecord], default_category: &str) -> Vec<Transaction> {
    let mut transactions: Vec<Transaction> = records
        .iter()
        .filter_map(|record| match record.normalize(default_category) {
            Ok(txn) => Some(txn),
            Err(err) => {
                warn!("skipping remote document: {err}");
                None
            }
        })
        .collect();
    transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    transactions
}

fn mark_ready(state: &watch::Sender<LedgerSnapshot>, epoch: u64) {
    state.send_if_modified(|snapshot| {
        if snapshot.epoch != epoch || snapshot.phase != LedgerPhase::Loading {
            return false;
        }
        snapshot.phase = LedgerPhase::Ready;
        true
    });
}

fn settle_purge(state: &watch::Sender<LedgerSnapshot>, epoch: u64, category: &str) {
    state.send_if_modified(|snapshot| {
        if snapshot.epoch == epoch {
            if let Some(purge) = snapshot.purges.get_mut(category) {
                purge.settled = true;
            }
        }
        false
    });
}

/// Undoes an optimistic cascade: lifts the filter and puts the rows back,
/// skipping any the feed has already restored.
fn restore_category(
    state: &watch::Sender<LedgerSnapshot>,
    epoch: u64,
    category: &str,
    taken: Vec<Transaction>,
) {
    state.send_if_modified(|snapshot| {
        if snapshot.epoch != epoch {
            return false;
        }
        snapshot.purges.remove(category);
        let before = snapshot.transactions.len();
        for txn in taken {
            let present = txn.id.is_some()
                && snapshot.transactions.iter().any(|known| known.id == txn.id);
            if !present {
                snapshot.transactions.push(txn);
            }
        }
        if snapshot.transactions.len() == before {
            return false;
        }
        snapshot
            .transactions
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        true
    });
}
