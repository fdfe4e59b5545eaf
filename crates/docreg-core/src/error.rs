//! Error types for the registry core.

use thiserror::Error;

use crate::types::ContentHash;

/// Shape errors raised while parsing primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    #[error("invalid document id: {0}")]
    InvalidDocumentId(String),

    #[error("invalid content hash: {0}")]
    InvalidHash(String),
}

/// Errors raised while walking a version chain.
///
/// `E` is the error type of the successor lookup (usually a store error).
#[derive(Debug, Error)]
pub enum ChainError<E> {
    #[error("version chain starting at {start} revisits {at}")]
    CycleDetected { start: ContentHash, at: ContentHash },

    #[error("version chain starting at {start} exceeds {limit} hops")]
    TooLong { start: ContentHash, limit: usize },

    #[error("successor lookup failed: {0}")]
    Lookup(E),
}
