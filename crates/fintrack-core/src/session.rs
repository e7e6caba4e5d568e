//! Keeps the ledger store and category registry scoped to the signed-in
//! identity.

use std::sync::Arc;

use fintrack_domain::Identity;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{info, warn};

use crate::{CategoryRegistry, CoreResult, IdentityProvider, LedgerStore};

pub struct SessionBinder {
    ledger: Arc<LedgerStore>,
    registry: Arc<CategoryRegistry>,
    // One bind at a time, so both stores always end on the same identity.
    binding: Mutex<()>,
}

impl SessionBinder {
    pub fn new(ledger: Arc<LedgerStore>, registry: Arc<CategoryRegistry>) -> Self {
        Self {
            ledger,
            registry,
            binding: Mutex::new(()),
        }
    }

    pub fn ledger(&self) -> &Arc<LedgerStore> {
        &self.ledger
    }

    pub fn registry(&self) -> &Arc<CategoryRegistry> {
        &self.registry
    }

    /// Rebinds both stores. Previous subscriptions are torn down before the
    /// new identity's data is requested, so no earlier identity's snapshot
    /// can surface afterwards. `None` leaves both stores unbound. Concurrent
    /// calls run one after the other.
    pub async fn bind(&self, identity: Option<Identity>) -> CoreResult<()> {
        let _binding = self.binding.lock().await;
        self.clear();

        let Some(identity) = identity else {
            info!("session cleared");
            return Ok(());
        };

        info!(identity = %identity, "binding session");
        self.registry.bind(identity.clone());
        let (categories, ledger) = tokio::join!(
            self.registry.load(),
            self.ledger.subscribe(identity)
        );
        categories?;
        ledger
    }

    fn clear(&self) {
        self.ledger.unbind();
        self.registry.unbind();
    }

    /// Follows `provider` until the returned handle is shut down, rebinding on
    /// every identity change. The current identity is bound right away.
    pub fn spawn(self: &Arc<Self>, provider: Arc<dyn IdentityProvider>) -> SessionHandle {
        let binder = Arc::clone(self);
        let mut changes = provider.changes();
        let task = tokio::spawn(async move {
            loop {
                let identity = changes.borrow_and_update().clone();
                if let Err(err) = binder.bind(identity).await {
                    warn!("session bind failed: {err}");
                }
                if changes.changed().await.is_err() {
                    break;
                }
            }
        });
        SessionHandle {
            task,
            binder: Arc::clone(self),
        }
    }
}

/// Background identity listener started by [`SessionBinder::spawn`].
pub struct SessionHandle {
    task: JoinHandle<()>,
    binder: Arc<SessionBinder>,
}

impl SessionHandle {
    /// Stops following the provider and unbinds both stores. Waits for a bind
    /// already in progress so it cannot rebind afterwards.
    pub async fn shutdown(self) {
        self.task.abort();
        let _binding = self.binder.binding.lock().await;
        self.binder.clear();
        info!("session listener stopped");
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
