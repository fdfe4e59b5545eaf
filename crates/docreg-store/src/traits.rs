//! Store trait: the abstract interface for registry persistence.
//!
//! This trait allows the registry to be storage-agnostic. Implementations
//! include SQLite (primary) and in-memory (for tests).

use docreg_core::{ContentHash, DocumentId, DocumentKey, DocumentRecord, Principal};

use crate::error::Result;

/// Result of inserting a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Document was inserted.
    Inserted,
    /// A record already exists under this key. Nothing was written.
    AlreadyExists,
}

/// The Store trait: persistence for documents, version links and the admin
/// scalar.
///
/// Every method is a single atomic step: a failed call writes nothing, and
/// no caller can observe half of a write.
///
/// # Design Notes
///
/// - **Insert-once documents**: `insert_document` checks and inserts in one
///   step and never overwrites an existing record.
/// - **Overwriting links**: `set_successor` replaces any previous successor
///   and hands it back so callers can apply their own relink policy.
pub trait Store: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Document Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a document record if the key is free.
    ///
    /// # Returns
    /// - `Inserted` if the key was free.
    /// - `AlreadyExists` if a record is already bound to the key.
    fn insert_document(&self, key: &DocumentKey, record: &DocumentRecord) -> Result<InsertResult>;

    /// Get the record bound to a key.
    fn get_document(&self, key: &DocumentKey) -> Result<Option<DocumentRecord>>;

    /// Check if a key is bound.
    fn has_document(&self, key: &DocumentKey) -> Result<bool>;

    /// All documents registered by `owner`, ordered by document id.
    fn documents_by_owner(&self, owner: &Principal) -> Result<Vec<(DocumentId, DocumentRecord)>>;

    /// Number of registered documents.
    fn document_count(&self) -> Result<u64>;

    // ─────────────────────────────────────────────────────────────────────────
    // Version Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the successor of `old`, returning the successor it replaced.
    fn set_successor(&self, old: &ContentHash, new: &ContentHash) -> Result<Option<ContentHash>>;

    /// Get the successor of `hash`, if linked.
    fn get_successor(&self, hash: &ContentHash) -> Result<Option<ContentHash>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Admin Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Load the persisted admin, if one was ever stored.
    fn load_admin(&self) -> Result<Option<Principal>>;

    /// Persist the admin, replacing any previous value.
    fn store_admin(&self, admin: &Principal) -> Result<()>;
}
