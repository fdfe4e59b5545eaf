//! Documents: the (owner, document id) key and the record bound to it.
//!
//! A record is created exactly once per key and never changes afterwards.
//! There is no update or delete path anywhere in the registry.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ContentHash, DocumentId, Height, Principal};

/// Primary key of the documents table.
///
/// Compared and hashed structurally, so no separator can make two
/// different (owner, id) pairs collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    pub owner: Principal,
    pub document_id: DocumentId,
}

impl DocumentKey {
    pub fn new(owner: Principal, document_id: DocumentId) -> Self {
        Self { owner, document_id }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.document_id)
    }
}

/// The record bound to a document key at registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Content hash supplied by the owner.
    pub hash: ContentHash,
    /// Height at which the document was registered.
    pub registered_at: Height,
    /// Free-form jurisdiction tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    /// Opaque pointer to off-registry metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_locator: Option<String>,
}

impl DocumentRecord {
    /// Create a record with no optional fields.
    pub fn new(hash: ContentHash, registered_at: Height) -> Self {
        Self {
            hash,
            registered_at,
            jurisdiction: None,
            metadata_locator: None,
        }
    }

    /// Set the jurisdiction tag.
    pub fn with_jurisdiction(mut self, jurisdiction: Option<String>) -> Self {
        self.jurisdiction = jurisdiction;
        self
    }

    /// Set the metadata locator.
    pub fn with_metadata_locator(mut self, locator: Option<String>) -> Self {
        self.metadata_locator = locator;
        self
    }

    /// Exact byte comparison against a candidate hash.
    pub fn matches(&self, candidate: &ContentHash) -> bool {
        self.hash == *candidate
    }
}
