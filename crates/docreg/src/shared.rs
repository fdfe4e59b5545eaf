//! A cloneable, task-safe handle to a Registry.
//!
//! Mutations take the write lock and reads take the read lock, so concurrent
//! callers never interleave inside an operation and every read sees a
//! consistent snapshot. Registry calls run on the blocking pool because the
//! store may do file I/O.

use std::sync::Arc;

use tokio::sync::RwLock;

use docreg_core::{CallContext, ContentHash, DocumentId, DocumentRecord, Principal, VersionStatus};
use docreg_store::Store;

use crate::error::{RegistryError, Result};
use crate::registry::Registry;

/// Shared handle to a [`Registry`].
pub struct SharedRegistry<S: Store> {
    inner: Arc<RwLock<Registry<S>>>,
}

impl<S: Store> Clone for SharedRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Store + 'static> SharedRegistry<S> {
    /// Wrap an opened registry.
    pub fn new(registry: Registry<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
        }
    }

    /// Run `f` under the read lock on the blocking pool.
    async fn read<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Registry<S>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let registry = inner.blocking_read();
            f(&registry)
        })
        .await
        .map_err(|e| RegistryError::Task(format!("spawn_blocking failed: {}", e)))?
    }

    /// Run `f` under the write lock on the blocking pool.
    async fn write<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Registry<S>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut registry = inner.blocking_write();
            f(&mut registry)
        })
        .await
        .map_err(|e| RegistryError::Task(format!("spawn_blocking failed: {}", e)))?
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations (write lock)
    // ─────────────────────────────────────────────────────────────────────────

    /// Hand the admin role to `new_admin`. See [`Registry::transfer_admin`].
    pub async fn transfer_admin(&self, ctx: CallContext, new_admin: Principal) -> Result<()> {
        self.write(move |r| r.transfer_admin(&ctx, new_admin)).await
    }

    /// Register `hash` under (caller, document_id). See [`Registry::register`].
    pub async fn register(
        &self,
        ctx: CallContext,
        document_id: DocumentId,
        hash: ContentHash,
        jurisdiction: Option<String>,
        metadata_locator: Option<String>,
    ) -> Result<()> {
        self.write(move |r| r.register(&ctx, document_id, hash, jurisdiction, metadata_locator))
            .await
    }

    /// Record that `new` supersedes `old`. See [`Registry::link_version`].
    pub async fn link_version(
        &self,
        ctx: CallContext,
        old: ContentHash,
        new: ContentHash,
    ) -> Result<()> {
        self.write(move |r| r.link_version(&ctx, old, new)).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries (read lock)
    // ─────────────────────────────────────────────────────────────────────────

    /// The identity currently holding the admin role.
    pub async fn admin(&self) -> Principal {
        self.inner.read().await.admin().clone()
    }

    /// Whether `caller` is the current admin.
    pub async fn is_admin(&self, caller: &Principal) -> bool {
        self.inner.read().await.is_admin(caller)
    }

    /// Get the record registered under (owner, document_id).
    pub async fn get(&self, owner: Principal, document_id: DocumentId) -> Result<DocumentRecord> {
        self.read(move |r| r.get(&owner, &document_id)).await
    }

    /// Check that `candidate` is exactly the registered hash. See [`Registry::verify`].
    pub async fn verify(
        &self,
        owner: Principal,
        document_id: DocumentId,
        candidate: ContentHash,
    ) -> Result<()> {
        self.read(move |r| r.verify(&owner, &document_id, &candidate))
            .await
    }

    /// Follow successors from `hash` to the latest version.
    pub async fn resolve_latest(&self, hash: ContentHash) -> Result<ContentHash> {
        self.read(move |r| r.resolve_latest(&hash)).await
    }

    /// Whether `hash` has been superseded, and by what.
    pub async fn version_status(&self, hash: ContentHash) -> Result<VersionStatus> {
        self.read(move |r| r.version_status(&hash)).await
    }

    /// Every hash from `hash` to its latest version, inclusive.
    pub async fn version_history(&self, hash: ContentHash) -> Result<Vec<ContentHash>> {
        self.read(move |r| r.version_history(&hash)).await
    }

    /// All documents registered by `owner`, ordered by document id.
    pub async fn documents_of(&self, owner: Principal) -> Result<Vec<(DocumentId, DocumentRecord)>> {
        self.read(move |r| r.documents_of(&owner)).await
    }

    /// Whether anything is registered under (owner, document_id).
    pub async fn is_registered(&self, owner: Principal, document_id: DocumentId) -> Result<bool> {
        self.read(move |r| r.is_registered(&owner, &document_id))
            .await
    }

    /// Number of registered documents.
    pub async fn document_count(&self) -> Result<u64> {
        self.read(|r| r.document_count()).await
    }
}
