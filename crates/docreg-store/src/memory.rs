//! In-memory implementation of the Store trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use docreg_core::{ContentHash, DocumentId, DocumentKey, DocumentRecord, Principal};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Documents indexed by structured key. Ordered so per-owner scans
    /// come out sorted by document id.
    documents: BTreeMap<DocumentKey, DocumentRecord>,

    /// Version links: old hash -> new hash.
    versions: HashMap<ContentHash, ContentHash>,

    /// The admin scalar.
    admin: Option<Principal>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn insert_document(&self, key: &DocumentKey, record: &DocumentRecord) -> Result<InsertResult> {
        let mut inner = self.inner.write().map_err(StoreError::poisoned)?;

        if inner.documents.contains_key(key) {
            return Ok(InsertResult::AlreadyExists);
        }

        inner.documents.insert(key.clone(), record.clone());
        Ok(InsertResult::Inserted)
    }

    fn get_document(&self, key: &DocumentKey) -> Result<Option<DocumentRecord>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.documents.get(key).cloned())
    }

    fn has_document(&self, key: &DocumentKey) -> Result<bool> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.documents.contains_key(key))
    }

    fn documents_by_owner(&self, owner: &Principal) -> Result<Vec<(DocumentId, DocumentRecord)>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner
            .documents
            .iter()
            .filter(|(key, _)| &key.owner == owner)
            .map(|(key, record)| (key.document_id.clone(), record.clone()))
            .collect())
    }

    fn document_count(&self) -> Result<u64> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.documents.len() as u64)
    }

    fn set_successor(&self, old: &ContentHash, new: &ContentHash) -> Result<Option<ContentHash>> {
        let mut inner = self.inner.write().map_err(StoreError::poisoned)?;
        Ok(inner.versions.insert(*old, *new))
    }

    fn get_successor(&self, hash: &ContentHash) -> Result<Option<ContentHash>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.versions.get(hash).copied())
    }

    fn load_admin(&self) -> Result<Option<Principal>> {
        let inner = self.inner.read().map_err(StoreError::poisoned)?;
        Ok(inner.admin.clone())
    }

    fn store_admin(&self, admin: &Principal) -> Result<()> {
        let mut inner = self.inner.write().map_err(StoreError::poisoned)?;
        inner.admin = Some(admin.clone());
        Ok(())
    }
}
