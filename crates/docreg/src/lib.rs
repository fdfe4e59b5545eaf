//! # Docreg
//!
//! A content-addressed document registry: binds (owner, document id) pairs to
//! content hashes, verifies candidate hashes against them, and keeps a chain
//! of "supersedes" links between hashes under a single admin.
//!
//! ## Key Concepts
//!
//! - **Registration**: Append-only. A key is bound once and never changes.
//! - **Verification**: Exact byte comparison against the registered hash.
//! - **Version link**: `old -> new`, admin only, one successor per hash.
//! - **Resolution**: Follow links to the latest version, with cycle and
//!   length guards.
//!
//! ## Usage
//!
//! ```rust
//! use docreg::{Registry, RegistryConfig};
//! use docreg::core::{CallContext, ContentHash, DocumentId, Height, Principal};
//! use docreg::store::MemoryStore;
//!
//! let admin = Principal::new("ST1ADMIN").unwrap();
//! let mut registry = Registry::open(MemoryStore::new(), RegistryConfig::new(admin.clone())).unwrap();
//!
//! let owner = Principal::new("ST2USER").unwrap();
//! let doc = DocumentId::new("abcd1234").unwrap();
//! let v1 = ContentHash::from_bytes([0x11; 32]);
//! let v2 = ContentHash::from_bytes([0x22; 32]);
//!
//! registry
//!     .register(&CallContext::new(owner.clone(), Height(1000)), doc.clone(), v1, None, None)
//!     .unwrap();
//! registry.verify(&owner, &doc, &v1).unwrap();
//!
//! registry
//!     .link_version(&CallContext::new(admin, Height(1001)), v1, v2)
//!     .unwrap();
//! assert_eq!(registry.resolve_latest(&v1).unwrap(), v2);
//! ```
//!
//! ## Re-exports
//!
//! - `docreg::core` - Primitives (ContentHash, Principal, DocumentRecord, etc.)
//! - `docreg::store` - Storage abstraction and SQLite

pub mod config;
pub mod error;
pub mod registry;
pub mod shared;

// Re-export component crates
pub use docreg_core as core;
pub use docreg_store as store;

// Re-export main types for convenience
pub use config::{RegistryConfig, RelinkPolicy, DEFAULT_BURN_IDENTITY};
pub use error::{RegistryError, Result};
pub use registry::Registry;
pub use shared::SharedRegistry;

// Re-export commonly used core types
pub use docreg_core::{
    CallContext, ContentHash, DocumentId, DocumentKey, DocumentRecord, Height, Principal,
    VersionStatus,
};
