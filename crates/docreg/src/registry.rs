//! The Registry: document registration, verification and version chains.
//!
//! The Registry owns its store, its configuration and a cached copy of the
//! admin scalar. Mutating operations take `&mut self`, so within a process
//! they are serialized by the borrow checker; see [`crate::SharedRegistry`]
//! for a handle that can be shared across tasks.

use docreg_core::{
    chain, CallContext, ChainError, ContentHash, DocumentId, DocumentKey, DocumentRecord,
    Principal, VersionStatus,
};
use docreg_store::{InsertResult, Store, StoreError};

use crate::config::{RegistryConfig, RelinkPolicy};
use crate::error::{RegistryError, Result};

/// The main Registry struct.
///
/// Provides:
/// - The authorization gate (`is_admin`, `transfer_admin`)
/// - Document registration and lookup (`register`, `get`, `verify`)
/// - Version linking and resolution (`link_version`, `resolve_latest`)
pub struct Registry<S: Store> {
    /// The storage backend.
    store: S,
    /// Configuration.
    config: RegistryConfig,
    /// Current admin, mirrored from the store.
    admin: Principal,
}

impl<S: Store> Registry<S> {
    /// Open a registry over `store`.
    ///
    /// If the store already holds an admin (a restart), that admin is kept.
    /// Otherwise `config.initial_admin` is persisted.
    ///
    /// # Errors
    /// - `InvalidAdmin` if the initial or persisted admin is the burn identity.
    pub fn open(store: S, config: RegistryConfig) -> Result<Self> {
        config.validate()?;

        let admin = match store.load_admin()? {
            Some(admin) if admin == config.burn_identity => {
                tracing::warn!(%admin, "persisted admin is the burn identity");
                return Err(RegistryError::InvalidAdmin(admin));
            }
            Some(admin) => {
                if admin != config.initial_admin {
                    tracing::debug!(
                        %admin,
                        configured = %config.initial_admin,
                        "persisted admin overrides configured initial admin"
                    );
                }
                admin
            }
            None => {
                store.store_admin(&config.initial_admin)?;
                config.initial_admin.clone()
            }
        };

        tracing::info!(%admin, max_chain_hops = config.max_chain_hops, "registry opened");

        Ok(Self {
            store,
            config,
            admin,
        })
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization Gate
    // ─────────────────────────────────────────────────────────────────────────

    /// The identity currently holding the admin role.
    pub fn admin(&self) -> &Principal {
        &self.admin
    }

    /// Whether `caller` is the current admin.
    pub fn is_admin(&self, caller: &Principal) -> bool {
        *caller == self.admin
    }

    /// The single check behind every admin-restricted mutation.
    fn ensure_admin(&self, caller: &Principal, action: &'static str) -> Result<()> {
        if self.is_admin(caller) {
            return Ok(());
        }
        tracing::warn!(%caller, action, "rejected admin action from non-admin");
        Err(RegistryError::Unauthorized {
            caller: caller.clone(),
        })
    }

    /// Hand the admin role to `new_admin`.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is the current admin.
    /// - `InvalidAdmin` if `new_admin` is the burn identity.
    pub fn transfer_admin(&mut self, ctx: &CallContext, new_admin: Principal) -> Result<()> {
        self.ensure_admin(&ctx.caller, "transfer_admin")?;

        if new_admin == self.config.burn_identity {
            tracing::warn!(%new_admin, "rejected transfer to burn identity");
            return Err(RegistryError::InvalidAdmin(new_admin));
        }

        // Persist first: if the write fails the cached admin is unchanged.
        self.store.store_admin(&new_admin)?;
        tracing::info!(from = %self.admin, to = %new_admin, height = %ctx.height, "admin transferred");
        self.admin = new_admin;
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Register `hash` under (caller, document_id).
    ///
    /// Anyone may register; ownership is the caller identity itself. The
    /// record's `registered_at` is the context height.
    ///
    /// # Errors
    /// - `AlreadyRegistered` if the caller already registered `document_id`,
    ///   whatever the hash.
    pub fn register(
        &mut self,
        ctx: &CallContext,
        document_id: DocumentId,
        hash: ContentHash,
        jurisdiction: Option<String>,
        metadata_locator: Option<String>,
    ) -> Result<()> {
        let key = DocumentKey::new(ctx.caller.clone(), document_id);
        let record = DocumentRecord::new(hash, ctx.height)
            .with_jurisdiction(jurisdiction)
            .with_metadata_locator(metadata_locator);

        match self.store.insert_document(&key, &record)? {
            InsertResult::Inserted => {
                tracing::debug!(%key, %hash, height = %ctx.height, "document registered");
                Ok(())
            }
            InsertResult::AlreadyExists => Err(RegistryError::AlreadyRegistered {
                owner: key.owner,
                document_id: key.document_id,
            }),
        }
    }

    /// Get the record registered under (owner, document_id).
    pub fn get(&self, owner: &Principal, document_id: &DocumentId) -> Result<DocumentRecord> {
        let key = DocumentKey::new(owner.clone(), document_id.clone());
        self.store
            .get_document(&key)?
            .ok_or(RegistryError::NotFound {
                owner: key.owner,
                document_id: key.document_id,
            })
    }

    /// Check that `candidate` is exactly the registered hash.
    ///
    /// # Errors
    /// - `NotFound` if nothing is registered under the key.
    /// - `HashMismatch` if the hashes differ in any byte.
    pub fn verify(
        &self,
        owner: &Principal,
        document_id: &DocumentId,
        candidate: &ContentHash,
    ) -> Result<()> {
        let record = self.get(owner, document_id)?;
        if record.matches(candidate) {
            Ok(())
        } else {
            Err(RegistryError::HashMismatch {
                registered: record.hash,
                candidate: *candidate,
            })
        }
    }

    /// Whether anything is registered under (owner, document_id).
    pub fn is_registered(&self, owner: &Principal, document_id: &DocumentId) -> Result<bool> {
        let key = DocumentKey::new(owner.clone(), document_id.clone());
        Ok(self.store.has_document(&key)?)
    }

    /// All documents registered by `owner`, ordered by document id.
    pub fn documents_of(&self, owner: &Principal) -> Result<Vec<(DocumentId, DocumentRecord)>> {
        Ok(self.store.documents_by_owner(owner)?)
    }

    /// Number of registered documents.
    pub fn document_count(&self) -> Result<u64> {
        Ok(self.store.document_count()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Version Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Record that `new` supersedes `old`.
    ///
    /// Under [`RelinkPolicy::Overwrite`] any previous successor of `old` is
    /// replaced. Under [`RelinkPolicy::Reject`] a different previous
    /// successor is an error and the same one is a no-op.
    ///
    /// # Errors
    /// - `Unauthorized` unless the caller is the admin.
    /// - `InvalidHash` if `new` is the null hash.
    /// - `AlreadyLinked` under the reject policy.
    pub fn link_version(
        &mut self,
        ctx: &CallContext,
        old: ContentHash,
        new: ContentHash,
    ) -> Result<()> {
        self.ensure_admin(&ctx.caller, "link_version")?;

        if new.is_zero() {
            return Err(RegistryError::InvalidHash(new));
        }

        if self.config.relink_policy == RelinkPolicy::Reject {
            match self.store.get_successor(&old)? {
                Some(existing) if existing == new => return Ok(()),
                Some(existing) => {
                    return Err(RegistryError::AlreadyLinked {
                        hash: old,
                        successor: existing,
                    })
                }
                None => {}
            }
        }

        let previous = self.store.set_successor(&old, &new)?;
        match previous {
            Some(previous) if previous != new => {
                tracing::debug!(%old, %previous, %new, "version relinked");
            }
            _ => tracing::debug!(%old, %new, "version linked"),
        }
        Ok(())
    }

    /// Whether `hash` has been superseded, and by what.
    pub fn version_status(&self, hash: &ContentHash) -> Result<VersionStatus> {
        Ok(VersionStatus::from_successor(
            self.store.get_successor(hash)?,
        ))
    }

    /// Follow successors from `hash` to the latest version.
    ///
    /// An unlinked hash resolves to itself.
    ///
    /// # Errors
    /// - `CycleDetected` if the chain loops.
    /// - `ChainTooLong` if it has more than `max_chain_hops` edges.
    pub fn resolve_latest(&self, hash: &ContentHash) -> Result<ContentHash> {
        chain::resolve_latest(*hash, self.config.max_chain_hops, |h| {
            self.store.get_successor(h)
        })
        .map_err(|e| self.chain_failure(e))
    }

    /// Every hash from `hash` to its latest version, inclusive.
    pub fn version_history(&self, hash: &ContentHash) -> Result<Vec<ContentHash>> {
        chain::version_path(*hash, self.config.max_chain_hops, |h| {
            self.store.get_successor(h)
        })
        .map_err(|e| self.chain_failure(e))
    }

    fn chain_failure(&self, e: ChainError<StoreError>) -> RegistryError {
        let err = RegistryError::from(e);
        if matches!(
            err,
            RegistryError::CycleDetected { .. } | RegistryError::ChainTooLong { .. }
        ) {
            tracing::warn!(error = %err, "version chain guard tripped");
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docreg_core::Height;
    use docreg_store::MemoryStore;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn p(s: &str) -> Principal {
        Principal::new(s).unwrap()
    }

    fn d(s: &str) -> DocumentId {
        DocumentId::new(s).unwrap()
    }

    fn h(n: u8) -> ContentHash {
        ContentHash::from_bytes([n; 32])
    }

    fn ctx(caller: &str) -> CallContext {
        CallContext::new(p(caller), Height(1000))
    }

    fn registry() -> Registry<MemoryStore> {
        Registry::open(MemoryStore::new(), RegistryConfig::new(p("ST1ADMIN"))).unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let mut reg = registry();
        reg.register(
            &ctx("ST2USER"),
            d("abcd1234"),
            h(1),
            Some("NG".into()),
            Some("ipfs://hash".into()),
        )
        .unwrap();

        let record = reg.get(&p("ST2USER"), &d("abcd1234")).unwrap();
        assert_eq!(record.hash, h(1));
        assert_eq!(record.registered_at, Height(1000));
        assert_eq!(record.jurisdiction.as_deref(), Some("NG"));
        assert_eq!(record.metadata_locator.as_deref(), Some("ipfs://hash"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut reg = registry();
        reg.register(&ctx("ST2USER"), d("abcd1234"), h(1), None, None)
            .unwrap();

        let err = reg
            .register(&ctx("ST2USER"), d("abcd1234"), h(2), None, None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyRegistered { .. }));
        assert_eq!(err.code(), 101);

        // First record survives.
        assert_eq!(reg.get(&p("ST2USER"), &d("abcd1234")).unwrap().hash, h(1));
    }

    #[test]
    fn test_same_id_different_owners() {
        let mut reg = registry();
        reg.register(&ctx("U1"), d("D1"), h(1), None, None).unwrap();
        reg.register(&ctx("U2"), d("D1"), h(2), None, None).unwrap();
        assert_eq!(reg.get(&p("U2"), &d("D1")).unwrap().hash, h(2));
        assert_eq!(reg.document_count().unwrap(), 2);
    }

    #[test]
    fn test_is_registered() {
        let mut reg = registry();
        assert!(!reg.is_registered(&p("U1"), &d("D1")).unwrap());
        reg.register(&ctx("U1"), d("D1"), h(1), None, None).unwrap();
        assert!(reg.is_registered(&p("U1"), &d("D1")).unwrap());
        assert!(!reg.is_registered(&p("U2"), &d("D1")).unwrap());
    }

    #[test]
    fn test_get_missing() {
        let reg = registry();
        let err = reg.get(&p("U1"), &d("nope")).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_verify() {
        let mut reg = registry();
        reg.register(&ctx("ST2USER"), d("abcd1234"), h(1), None, None)
            .unwrap();

        reg.verify(&p("ST2USER"), &d("abcd1234"), &h(1)).unwrap();

        let err = reg
            .verify(&p("ST2USER"), &d("abcd1234"), &h(9))
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::HashMismatch { registered, candidate } if registered == h(1) && candidate == h(9)
        ));

        let err = reg.verify(&p("ST2USER"), &d("missing"), &h(1)).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn test_link_requires_admin() {
        let mut reg = registry();
        let err = reg.link_version(&ctx("ST2USER"), h(1), h(2)).unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));
        assert_eq!(reg.version_status(&h(1)).unwrap(), VersionStatus::Unlinked);
    }

    #[test]
    fn test_link_and_resolve() {
        let mut reg = registry();
        reg.link_version(&ctx("ST1ADMIN"), h(1), h(2)).unwrap();
        reg.link_version(&ctx("ST1ADMIN"), h(2), h(3)).unwrap();

        assert_eq!(reg.resolve_latest(&h(1)).unwrap(), h(3));
        assert_eq!(reg.resolve_latest(&h(3)).unwrap(), h(3));
        assert_eq!(reg.version_history(&h(1)).unwrap(), vec![h(1), h(2), h(3)]);
        assert_eq!(
            reg.version_status(&h(2)).unwrap(),
            VersionStatus::Linked { successor: h(3) }
        );
    }

    #[test]
    fn test_link_rejects_null_successor() {
        let mut reg = registry();
        let err = reg
            .link_version(&ctx("ST1ADMIN"), h(1), ContentHash::ZERO)
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidHash(_)));
        assert!(reg.version_status(&h(1)).unwrap().is_terminal());
    }

    #[test]
    fn test_transfer_admin() {
        let mut reg = registry();
        reg.transfer_admin(&ctx("ST1ADMIN"), p("ST3NEWADMIN"))
            .unwrap();
        assert_eq!(reg.admin(), &p("ST3NEWADMIN"));
        assert!(!reg.is_admin(&p("ST1ADMIN")));
        assert_eq!(reg.store().load_admin().unwrap(), Some(p("ST3NEWADMIN")));
    }

    #[test]
    fn test_transfer_admin_rejections() {
        let mut reg = registry();

        let err = reg
            .transfer_admin(&ctx("ST2USER"), p("SP000000000000000000002Q6VF78"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized { .. }));

        let err = reg
            .transfer_admin(&ctx("ST1ADMIN"), p("SP000000000000000000002Q6VF78"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::InvalidAdmin(_)));
        assert_eq!(reg.admin(), &p("ST1ADMIN"));
    }

    /// Memory store whose writes fail while `fail_writes` is set.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl FlakyStore {
        fn check_write(&self) -> docreg_store::Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::InvalidData("disk full".into()));
            }
            Ok(())
        }
    }

    impl Store for FlakyStore {
        fn insert_document(
            &self,
            key: &DocumentKey,
            record: &DocumentRecord,
        ) -> docreg_store::Result<InsertResult> {
            self.check_write()?;
            self.inner.insert_document(key, record)
        }

        fn get_document(&self, key: &DocumentKey) -> docreg_store::Result<Option<DocumentRecord>> {
            self.inner.get_document(key)
        }

        fn has_document(&self, key: &DocumentKey) -> docreg_store::Result<bool> {
            self.inner.has_document(key)
        }

        fn documents_by_owner(
            &self,
            owner: &Principal,
        ) -> docreg_store::Result<Vec<(DocumentId, DocumentRecord)>> {
            self.inner.documents_by_owner(owner)
        }

        fn document_count(&self) -> docreg_store::Result<u64> {
            self.inner.document_count()
        }

        fn set_successor(
            &self,
            old: &ContentHash,
            new: &ContentHash,
        ) -> docreg_store::Result<Option<ContentHash>> {
            self.check_write()?;
            self.inner.set_successor(old, new)
        }

        fn get_successor(&self, hash: &ContentHash) -> docreg_store::Result<Option<ContentHash>> {
            self.inner.get_successor(hash)
        }

        fn load_admin(&self) -> docreg_store::Result<Option<Principal>> {
            self.inner.load_admin()
        }

        fn store_admin(&self, admin: &Principal) -> docreg_store::Result<()> {
            self.check_write()?;
            self.inner.store_admin(admin)
        }
    }

    #[test]
    fn test_failed_writes_leave_state_unchanged() {
        let mut reg = Registry::open(FlakyStore::default(), RegistryConfig::new(p("ST1ADMIN")))
            .unwrap();
        reg.register(&ctx("U1"), d("D1"), h(1), None, None).unwrap();
        reg.link_version(&ctx("ST1ADMIN"), h(1), h(2)).unwrap();

        reg.store().fail_writes.store(true, Ordering::SeqCst);

        let err = reg
            .transfer_admin(&ctx("ST1ADMIN"), p("ST3NEWADMIN"))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert_eq!(err.code(), 500);
        assert_eq!(reg.admin(), &p("ST1ADMIN"));
        assert!(!reg.is_admin(&p("ST3NEWADMIN")));
        assert_eq!(reg.store().load_admin().unwrap(), Some(p("ST1ADMIN")));

        let err = reg
            .register(&ctx("U1"), d("D2"), h(5), None, None)
            .unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert!(matches!(
            reg.get(&p("U1"), &d("D2")),
            Err(RegistryError::NotFound { .. })
        ));
        assert_eq!(reg.get(&p("U1"), &d("D1")).unwrap().hash, h(1));
        assert_eq!(reg.document_count().unwrap(), 1);

        let err = reg
            .link_version(&ctx("ST1ADMIN"), h(2), h(3))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Store(_)));
        assert_eq!(reg.resolve_latest(&h(1)).unwrap(), h(2));
        assert_eq!(reg.version_status(&h(2)).unwrap(), VersionStatus::Unlinked);

        // Once the store recovers, the same calls go through.
        reg.store().fail_writes.store(false, Ordering::SeqCst);
        reg.transfer_admin(&ctx("ST1ADMIN"), p("ST3NEWADMIN"))
            .unwrap();
        assert_eq!(reg.admin(), &p("ST3NEWADMIN"));
    }

    #[test]
    fn test_open_fails_when_admin_cannot_be_persisted() {
        let store = FlakyStore::default();
        store.fail_writes.store(true, Ordering::SeqCst);

        let result = Registry::open(store, RegistryConfig::new(p("ST1ADMIN")));
        assert!(matches!(result, Err(RegistryError::Store(_))));
    }

    #[test]
    fn test_open_keeps_persisted_admin() {
        let store = MemoryStore::new();
        store.store_admin(&p("A2")).unwrap();

        let reg = Registry::open(store, RegistryConfig::new(p("A1"))).unwrap();
        assert_eq!(reg.admin(), &p("A2"));
    }
}
