use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use async_trait::async_trait;
use fintrack_core::{CategoryRemote, FeedSender, LiveFeed, RemoteError, TransactionRemote};
use fintrack_domain::{CategoryRecord, Identity, TransactionId, TransactionRecord};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{MemoryRemoteError, RemoteSnapshot, StoredCategory};

/// Visibility of category documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryScope {
    /// Each owner sees only the categories they created.
    #[default]
    Owner,
    /// One shared category set for every owner.
    Global,
}

/// Transaction and category documents held in process memory.
///
/// Every write pushes a fresh snapshot to the owner's open feeds. When opened
/// on a file, every write is also mirrored to disk.
pub struct MemoryRemote {
    scope: CategoryScope,
    persist_path: Option<PathBuf>,
    subscribe_delay: Option<Duration>,
    fetch_delay: Option<Duration>,
    purge_delay: Option<Duration>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    documents: RemoteSnapshot,
    feeds: HashMap<String, Vec<FeedSender>>,
    /// Feeds opened while suppressed, keyed by owner.
    silenced: Vec<(String, FeedSender)>,
    suppress_feeds: bool,
    fail_writes: bool,
    fail_purges: bool,
    fail_next_write: bool,
    fail_reads: bool,
    writes: usize,
}

impl State {
    fn owned_by(&self, owner: &str) -> Vec<TransactionRecord> {
        self.documents
            .transactions
            .iter()
            .filter(|record| record.user_id.as_deref() == Some(owner))
            .cloned()
            .collect()
    }

    fn broadcast(&mut self, owner: &str) {
        let records = self.owned_by(owner);
        if let Some(senders) = self.feeds.get_mut(owner) {
            senders.retain(|tx| tx.send(records.clone()).is_ok());
            debug!(owner, open = senders.len(), "pushed feed snapshot");
        }
    }

    fn begin_write(&mut self) -> Result<(), RemoteError> {
        self.writes += 1;
        if self.fail_next_write {
            self.fail_next_write = false;
            return Err(RemoteError::Unavailable("injected write failure".into()));
        }
        if self.fail_writes {
            return Err(RemoteError::Unavailable("writes are failing".into()));
        }
        Ok(())
    }

    /// Hands every silenced feed that is still open the owner's current
    /// documents and moves it to the live set.
    fn release_silenced(&mut self) {
        for (owner, tx) in std::mem::take(&mut self.silenced) {
            if tx.send(self.owned_by(&owner)).is_ok() {
                self.feeds.entry(owner).or_default().push(tx);
            }
        }
    }

    fn begin_read(&self) -> Result<(), RemoteError> {
        if self.fail_reads {
            return Err(RemoteError::Unavailable("reads are failing".into()));
        }
        Ok(())
    }
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            scope: CategoryScope::Owner,
            persist_path: None,
            subscribe_delay: None,
            fetch_delay: None,
            purge_delay: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Loads documents from `path` (if it exists) and mirrors every later
    /// write back to it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MemoryRemoteError> {
        let path = path.into();
        let documents = RemoteSnapshot::load_from_path(&path)?;
        let remote = Self {
            persist_path: Some(path),
            ..Self::new()
        };
        remote.lock().documents = documents;
        Ok(remote)
    }

    pub fn with_scope(mut self, scope: CategoryScope) -> Self {
        self.scope = scope;
        self
    }

    /// Delays every `subscribe` call before the feed is handed out.
    pub fn with_subscribe_delay(mut self, delay: Duration) -> Self {
        self.subscribe_delay = Some(delay);
        self
    }

    /// `fetch_once` reads the documents, then waits this long before
    /// answering.
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Delays every `delete_by_category` call before it runs.
    pub fn with_purge_delay(mut self, delay: Duration) -> Self {
        self.purge_delay = Some(delay);
        self
    }

    pub fn scope(&self) -> CategoryScope {
        self.scope
    }

    pub fn snapshot(&self) -> RemoteSnapshot {
        self.lock().documents.clone()
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), MemoryRemoteError> {
        self.snapshot().save_to_path(path)
    }

    /// Feeds opened from now on deliver nothing, not even the initial
    /// snapshot, until suppression is lifted. Lifting it sends those feeds
    /// the current documents and makes them live.
    pub fn suppress_feeds(&self, suppress: bool) {
        let mut state = self.lock();
        state.suppress_feeds = suppress;
        if !suppress {
            state.release_silenced();
        }
    }

    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Only `delete_by_category` fails; every other write goes through.
    pub fn fail_purges(&self, fail: bool) {
        self.lock().fail_purges = fail;
    }

    pub fn fail_next_write(&self) {
        self.lock().fail_next_write = true;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Number of write calls received, failed ones included.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn open_feeds(&self, owner: &Identity) -> usize {
        self.lock()
            .feeds
            .get(owner.as_str())
            .map_or(0, |senders| senders.iter().filter(|tx| !tx.is_closed()).count())
    }

    /// Re-sends the owner's current documents to every open feed.
    pub fn push_snapshot(&self, owner: &Identity) {
        self.lock().broadcast(owner.as_str());
    }

    pub fn transactions_of(&self, owner: &Identity) -> Vec<TransactionRecord> {
        self.lock().owned_by(owner.as_str())
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn commit(&self, state: &mut State, owners: &[&str]) {
        for owner in owners {
            state.broadcast(owner);
        }
        if let Some(path) = &self.persist_path {
            if let Err(err) = state.documents.save_to_path(path) {
                error!(path = %path.display(), "failed to mirror documents: {err}");
            }
        }
    }

    fn category_visible(&self, category: &StoredCategory, owner: &Identity) -> bool {
        match self.scope {
            CategoryScope::Owner => category.owner.as_deref() == Some(owner.as_str()),
            CategoryScope::Global => true,
        }
    }
}

#[async_trait]
impl TransactionRemote for MemoryRemote {
    async fn subscribe(&self, owner: &Identity) -> Result<LiveFeed, RemoteError> {
        if let Some(delay) = self.subscribe_delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.lock();
        state.begin_read()?;
        let (tx, feed) = LiveFeed::channel();
        if state.suppress_feeds {
            state.silenced.retain(|(_, silenced)| !silenced.is_closed());
            state.silenced.push((owner.as_str().to_string(), tx));
            return Ok(feed);
        }
        let current = state.owned_by(owner.as_str());
        if tx.send(current).is_ok() {
            state
                .feeds
                .entry(owner.as_str().to_string())
                .or_default()
                .push(tx);
        }
        Ok(feed)
    }

    async fn fetch_once(&self, owner: &Identity) -> Result<Vec<TransactionRecord>, RemoteError> {
        let records = {
            let state = self.lock();
            state.begin_read()?;
            state.owned_by(owner.as_str())
        };
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(records)
    }

    async fn create(
        &self,
        owner: &Identity,
        mut record: TransactionRecord,
    ) -> Result<TransactionId, RemoteError> {
        let mut state = self.lock();
        state.begin_write()?;
        let id = Uuid::new_v4().to_string();
        record.id = Some(id.clone());
        record.user_id = Some(owner.as_str().to_string());
        state.documents.transactions.push(record);
        self.commit(&mut state, &[owner.as_str()]);
        Ok(TransactionId::new(id))
    }

    async fn update(
        &self,
        id: &TransactionId,
        mut record: TransactionRecord,
    ) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.begin_write()?;
        let Some(existing) = state
            .documents
            .transactions
            .iter_mut()
            .find(|doc| doc.id.as_deref() == Some(id.as_str()))
        else {
            return Err(RemoteError::NotFound(id.to_string()));
        };
        record.id = existing.id.clone();
        record.user_id = existing.user_id.clone();
        let owner = record.user_id.clone().unwrap_or_default();
        *existing = record;
        self.commit(&mut state, &[owner.as_str()]);
        Ok(())
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.begin_write()?;
        let Some(position) = state
            .documents
            .transactions
            .iter()
            .position(|doc| doc.id.as_deref() == Some(id.as_str()))
        else {
            return Err(RemoteError::NotFound(id.to_string()));
        };
        let removed = state.documents.transactions.remove(position);
        let owner = removed.user_id.unwrap_or_default();
        self.commit(&mut state, &[owner.as_str()]);
        Ok(())
    }

    async fn delete_by_category(
        &self,
        owner: &Identity,
        category: &str,
    ) -> Result<usize, RemoteError> {
        if let Some(delay) = self.purge_delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.lock();
        state.begin_write()?;
        if state.fail_purges {
            return Err(RemoteError::Unavailable("purges are failing".into()));
        }
        let before = state.documents.transactions.len();
        state.documents.transactions.retain(|doc| {
            !(doc.user_id.as_deref() == Some(owner.as_str()) && doc.category_is(category))
        });
        let removed = before - state.documents.transactions.len();
        if removed > 0 {
            self.commit(&mut state, &[owner.as_str()]);
        }
        Ok(removed)
    }
}

#[async_trait]
impl CategoryRemote for MemoryRemote {
    async fn list(&self, owner: &Identity) -> Result<Vec<CategoryRecord>, RemoteError> {
        let state = self.lock();
        state.begin_read()?;
        Ok(state
            .documents
            .categories
            .iter()
            .filter(|category| self.category_visible(category, owner))
            .map(|category| CategoryRecord::new(category.name.clone()))
            .collect())
    }

    async fn insert(&self, owner: &Identity, record: CategoryRecord) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.begin_write()?;
        let stored_owner = match self.scope {
            CategoryScope::Owner => Some(owner.as_str().to_string()),
            CategoryScope::Global => None,
        };
        state.documents.categories.push(StoredCategory {
            owner: stored_owner,
            name: record.name,
        });
        self.commit(&mut state, &[]);
        Ok(())
    }

    async fn delete(&self, owner: &Identity, name: &str) -> Result<usize, RemoteError> {
        let mut state = self.lock();
        state.begin_write()?;
        let before = state.documents.categories.len();
        state.documents.categories.retain(|category| {
            !(category.name == name && self.category_visible(category, owner))
        });
        let removed = before - state.documents.categories.len();
        if removed > 0 {
            self.commit(&mut state, &[]);
        }
        Ok(removed)
    }
}
