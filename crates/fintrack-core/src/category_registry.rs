//! Reactive set of category names for the bound identity.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use fintrack_domain::{CategoryRecord, Identity};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{CategoryRemote, CoreError, CoreResult, SyncSettings};

/// The one ledger capability the registry needs: purging a deleted
/// category's transactions.
#[async_trait]
pub trait CategoryCascade: Send + Sync {
    /// Removes every transaction in `category` from the local projection and
    /// then from the remote store. Returns how many local entries were
    /// removed. A failed remote purge leaves the projection as it was.
    async fn cascade_delete(&self, category: &str) -> CoreResult<usize>;

    /// Number of projected transactions referencing `category`.
    fn count_in_category(&self, category: &str) -> usize;
}

#[derive(Debug, Clone, Default)]
pub struct CategorySnapshot {
    identity: Option<Identity>,
    names: Vec<String>,
    loaded: bool,
    epoch: u64,
}

impl CategorySnapshot {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Names in load order, then insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|existing| existing == name)
    }
}

/// A deletion the user has been asked to confirm. Obtained from
/// [`CategoryRegistry::request_delete`] and consumed by
/// [`CategoryRegistry::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    category: String,
    dependents: usize,
    epoch: u64,
}

impl PendingDeletion {
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Transactions in the local projection that the cascade will remove.
    pub fn dependents(&self) -> usize {
        self.dependents
    }

    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete \"{}\"? This will also remove {} transaction(s) associated with it.",
            self.category, self.dependents
        )
    }
}

impl fmt::Display for PendingDeletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prompt())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub category: String,
    pub removed_transactions: usize,
    pub remote_documents: usize,
}

pub struct CategoryRegistry {
    remote: Arc<dyn CategoryRemote>,
    cascade: Arc<dyn CategoryCascade>,
    settings: SyncSettings,
    state: watch::Sender<CategorySnapshot>,
}

impl CategoryRegistry {
    pub fn new(
        remote: Arc<dyn CategoryRemote>,
        cascade: Arc<dyn CategoryCascade>,
        settings: SyncSettings,
    ) -> Self {
        let (state, _) = watch::channel(CategorySnapshot::default());
        Self {
            remote,
            cascade,
            settings,
            state,
        }
    }

    pub fn watch(&self) -> watch::Receiver<CategorySnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CategorySnapshot {
        self.state.borrow().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.state.borrow().names.clone()
    }

    pub fn default_category(&self) -> &str {
        &self.settings.default_category
    }

    /// Scopes the registry to `identity` with an empty, unloaded set.
    pub fn bind(&self, identity: Identity) {
        self.reset(Some(identity));
    }

    pub fn unbind(&self) {
        self.reset(None);
    }

    /// Fetches the category set, bootstrapping the default category when the
    /// set is empty (or lacks it) before publishing.
    pub async fn load(&self) -> CoreResult<Vec<String>> {
        let (identity, epoch) = self.bound()?;
        let records = self
            .remote
            .list(&identity)
            .await
            .map_err(CoreError::RemoteRead)?;

        let mut names: Vec<String> = Vec::with_capacity(records.len() + 1);
        for record in records {
            if !names.contains(&record.name) {
                names.push(record.name);
            }
        }

        let default = &self.settings.default_category;
        if !names.contains(default) {
            self.remote
                .insert(&identity, CategoryRecord::new(default.as_str()))
                .await
                .map_err(CoreError::RemoteWrite)?;
            if names.is_empty() {
                info!(identity = %identity, "bootstrapped default category");
            } else {
                warn!(identity = %identity, "category set lacked the default category; restored it");
            }
            names.push(default.clone());
        }

        let published = names.clone();
        self.publish(epoch, move |snapshot| {
            snapshot.names = published;
            snapshot.loaded = true;
        });
        Ok(names)
    }

    /// Creates a category. Blank names and exact duplicates are refused.
    pub async fn add(&self, name: &str) -> CoreResult<String> {
        let (identity, epoch) = self.bound()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("category name is required".into()));
        }
        if self.state.borrow().contains(name) {
            return Err(CoreError::Validation(format!(
                "category `{name}` already exists"
            )));
        }

        self.remote
            .insert(&identity, CategoryRecord::new(name))
            .await
            .map_err(CoreError::RemoteWrite)?;

        let added = name.to_string();
        self.publish(epoch, move |snapshot| {
            if !snapshot.contains(&added) {
                snapshot.names.push(added);
            }
        });
        info!(identity = %identity, category = name, "category added");
        Ok(name.to_string())
    }

    /// Adds `name` unless it already exists. Used when a transaction is saved
    /// with a category the user typed in. Returns whether it was created.
    pub async fn ensure(&self, name: &str) -> CoreResult<bool> {
        let trimmed = name.trim();
        if !trimmed.is_empty() && self.state.borrow().contains(trimmed) {
            return Ok(false);
        }
        self.add(trimmed).await.map(|_| true)
    }

    /// First step of a deletion: checks the category can go and describes
    /// the cascade for the confirmation prompt.
    pub fn request_delete(&self, name: &str) -> CoreResult<PendingDeletion> {
        let (_, epoch) = self.bound()?;
        if name == self.settings.default_category {
            return Err(CoreError::Validation(format!(
                "the default category `{name}` cannot be deleted"
            )));
        }
        if !self.state.borrow().contains(name) {
            return Err(CoreError::CategoryNotFound(name.to_string()));
        }
        Ok(PendingDeletion {
            category: name.to_string(),
            dependents: self.cascade.count_in_category(name),
            epoch,
        })
    }

    /// Deletes a confirmed category: remote delete first, then the ledger
    /// cascade, then the local set. A failed remote delete stops everything;
    /// a failed cascade re-creates the remote category so no transaction is
    /// left pointing at a missing one.
    pub async fn delete(&self, confirmed: PendingDeletion) -> CoreResult<DeletionReport> {
        let (identity, epoch) = self.bound()?;
        if confirmed.epoch != epoch {
            return Err(CoreError::Validation(
                "deletion was confirmed for a different session".into(),
            ));
        }
        let category = confirmed.category;

        let remote_documents = self
            .remote
            .delete(&identity, &category)
            .await
            .map_err(CoreError::RemoteWrite)?;

        if self.state.borrow().epoch != epoch {
            warn!(category = %category, "session changed during deletion; skipping local cascade");
            return Ok(DeletionReport {
                category,
                removed_transactions: 0,
                remote_documents,
            });
        }

        let removed_transactions = match self.cascade.cascade_delete(&category).await {
            Ok(removed) => removed,
            Err(err) => {
                self.restore_remote(&identity, &category).await;
                return Err(err);
            }
        };

        let removed = category.clone();
        self.publish(epoch, move |snapshot| {
            snapshot.names.retain(|name| *name != removed);
        });
        info!(
            identity = %identity,
            category = %category,
            removed_transactions,
            "category deleted"
        );
        Ok(DeletionReport {
            category,
            removed_transactions,
            remote_documents,
        })
    }

    async fn restore_remote(&self, identity: &Identity, category: &str) {
        match self
            .remote
            .insert(identity, CategoryRecord::new(category))
            .await
        {
            Ok(()) => warn!(category, "cascade failed; category restored"),
            Err(err) => error!(category, "cascade failed; restoring the category failed: {err}"),
        }
    }

    fn bound(&self) -> CoreResult<(Identity, u64)> {
        let snapshot = self.state.borrow();
        snapshot
            .identity
            .clone()
            .map(|identity| (identity, snapshot.epoch))
            .ok_or(CoreError::AuthRequired)
    }

    fn reset(&self, identity: Option<Identity>) {
        self.state.send_modify(|snapshot| {
            *snapshot = CategorySnapshot {
                identity,
                names: Vec::new(),
                loaded: false,
                epoch: snapshot.epoch + 1,
            };
        });
    }

    fn publish(&self, epoch: u64, update: impl FnOnce(&mut CategorySnapshot)) -> bool {
        self.state.send_if_modified(|snapshot| {
            if snapshot.epoch != epoch {
                return false;
            }
            update(snapshot);
            true
        })
    }
}
