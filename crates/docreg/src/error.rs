//! Error types for the Registry.

use docreg_core::{ChainError, ContentHash, DocumentId, Principal};
use docreg_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Registry operations.
///
/// Every failed operation leaves the registry exactly as it was.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Caller lacks the privilege an admin-gated action needs.
    #[error("not authorized: {caller} is not the registry admin")]
    Unauthorized { caller: Principal },

    /// Proposed admin is a reserved sentinel identity.
    #[error("invalid admin: {0} is reserved")]
    InvalidAdmin(Principal),

    /// A record is already bound to (owner, document id).
    #[error("document already registered: {owner}/{document_id}")]
    AlreadyRegistered {
        owner: Principal,
        document_id: DocumentId,
    },

    /// No record is bound to (owner, document id).
    #[error("document not found: {owner}/{document_id}")]
    NotFound {
        owner: Principal,
        document_id: DocumentId,
    },

    /// Candidate hash differs from the registered one.
    #[error("hash mismatch: registered {registered}, candidate {candidate}")]
    HashMismatch {
        registered: ContentHash,
        candidate: ContentHash,
    },

    /// Version chain revisits a hash.
    #[error("version cycle: chain from {start} revisits {at}")]
    CycleDetected { start: ContentHash, at: ContentHash },

    /// Version chain is longer than the configured hop limit.
    #[error("version chain from {start} exceeds {limit} hops")]
    ChainTooLong { start: ContentHash, limit: usize },

    /// Hash already has a different successor and relinking is disabled.
    #[error("{hash} is already linked to {successor}")]
    AlreadyLinked {
        hash: ContentHash,
        successor: ContentHash,
    },

    /// Hash is the null sentinel.
    #[error("invalid hash: {0} is the null hash")]
    InvalidHash(ContentHash),

    /// Configuration could not be parsed or is inconsistent.
    #[error("invalid config: {0}")]
    Config(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Background task running a registry call failed.
    #[error("registry task failed: {0}")]
    Task(String),
}

impl RegistryError {
    /// Stable numeric code for RPC front-ends.
    pub fn code(&self) -> u32 {
        match self {
            RegistryError::Unauthorized { .. } => 100,
            RegistryError::AlreadyRegistered { .. } => 101,
            RegistryError::NotFound { .. } => 102,
            RegistryError::HashMismatch { .. } => 103,
            RegistryError::InvalidAdmin(_) => 104,
            RegistryError::CycleDetected { .. } => 105,
            RegistryError::ChainTooLong { .. } => 106,
            RegistryError::AlreadyLinked { .. } => 107,
            RegistryError::InvalidHash(_) => 108,
            RegistryError::Config(_) => 400,
            RegistryError::Store(_) => 500,
            RegistryError::Task(_) => 501,
        }
    }
}

impl From<ChainError<StoreError>> for RegistryError {
    fn from(e: ChainError<StoreError>) -> Self {
        match e {
            ChainError::CycleDetected { start, at } => RegistryError::CycleDetected { start, at },
            ChainError::TooLong { start, limit } => RegistryError::ChainTooLong { start, limit },
            ChainError::Lookup(e) => RegistryError::Store(e),
        }
    }
}

/// Result type for Registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
