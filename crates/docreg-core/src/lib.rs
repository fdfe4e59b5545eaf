//! # Docreg Core
//!
//! Pure primitives for the document registry: identities, content hashes,
//! document records and version chains.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`ContentHash`] - Caller-supplied 32-byte digest of a document
//! - [`Principal`] - An authenticated caller identity
//! - [`DocumentKey`] - Structured (owner, document id) primary key
//! - [`DocumentRecord`] - What a registration binds to a key
//! - [`VersionStatus`] - Whether a hash has been superseded
//!
//! ## Version Chains
//!
//! Chain traversal is bounded. See the [`chain`] module.

pub mod chain;
pub mod document;
pub mod error;
pub mod types;
pub mod validation;

pub use chain::{resolve_latest, version_path, VersionStatus, DEFAULT_MAX_HOPS};
pub use document::{DocumentKey, DocumentRecord};
pub use error::{ChainError, CoreError};
pub use types::{CallContext, ContentHash, DocumentId, Height, Principal};
pub use validation::{validate_document_id, validate_principal};
