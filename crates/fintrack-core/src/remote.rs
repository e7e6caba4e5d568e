//! Collaborator seams: remote transaction/category stores and the identity provider.

use async_trait::async_trait;
use fintrack_domain::{CategoryRecord, Identity, TransactionId, TransactionRecord};
use tokio::sync::{mpsc, watch};

use crate::RemoteError;

/// Sending half of a live feed, held by the remote store.
pub type FeedSender = mpsc::UnboundedSender<Vec<TransactionRecord>>;

/// A continuously-updated view of one owner's transaction documents.
///
/// Every message is a complete snapshot of the owner's documents. Dropping
/// the feed unsubscribes.
#[derive(Debug)]
pub struct LiveFeed {
    updates: mpsc::UnboundedReceiver<Vec<TransactionRecord>>,
}

impl LiveFeed {
    pub fn channel() -> (FeedSender, LiveFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, LiveFeed { updates: rx })
    }

    /// Waits for the next snapshot. Returns `None` once the remote closes the feed.
    pub async fn next(&mut self) -> Option<Vec<TransactionRecord>> {
        self.updates.recv().await
    }
}

/// Remote per-user transaction store.
#[async_trait]
pub trait TransactionRemote: Send + Sync {
    /// Opens a real-time subscription filtered by owner.
    async fn subscribe(&self, owner: &Identity) -> Result<LiveFeed, RemoteError>;
    /// One-shot read of the owner's documents.
    async fn fetch_once(&self, owner: &Identity) -> Result<Vec<TransactionRecord>, RemoteError>;
    async fn create(
        &self,
        owner: &Identity,
        record: TransactionRecord,
    ) -> Result<TransactionId, RemoteError>;
    /// Full replacement of an existing document. Missing ids fail with
    /// [`RemoteError::NotFound`].
    async fn update(&self, id: &TransactionId, record: TransactionRecord)
        -> Result<(), RemoteError>;
    async fn delete(&self, id: &TransactionId) -> Result<(), RemoteError>;
    /// Query-then-delete of every owner document in `category`.
    async fn delete_by_category(&self, owner: &Identity, category: &str)
        -> Result<usize, RemoteError>;
}

/// Remote category store.
#[async_trait]
pub trait CategoryRemote: Send + Sync {
    async fn list(&self, owner: &Identity) -> Result<Vec<CategoryRecord>, RemoteError>;
    async fn insert(&self, owner: &Identity, record: CategoryRecord) -> Result<(), RemoteError>;
    /// Query-then-bulk-delete by name; returns how many documents were removed.
    async fn delete(&self, owner: &Identity, name: &str) -> Result<usize, RemoteError>;
}

/// Source of the authenticated identity.
pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> Option<Identity>;
    /// Change notifications. The receiver starts at the current value.
    fn changes(&self) -> watch::Receiver<Option<Identity>>;
}
