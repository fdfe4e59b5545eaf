//! # Docreg Store
//!
//! Storage abstraction for the document registry. Provides a trait-based
//! interface for persisting documents, version links and the admin scalar,
//! with SQLite and in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Store`] - The trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`InsertResult`] - Result of inserting a document
//!
//! ## Usage
//!
//! ```rust,no_run
//! use docreg_store::{SqliteStore, Store};
//!
//! // Open a SQLite database
//! let store = SqliteStore::open("registry.db").unwrap();
//!
//! // Or use an in-memory database for testing
//! let store = SqliteStore::open_memory().unwrap();
//! assert_eq!(store.document_count().unwrap(), 0);
//! ```
//!
//! ## Design Notes
//!
//! - **Insert-once documents**: inserting under a bound key returns `AlreadyExists`
//!   and leaves the existing record untouched
//! - **Last-writer-wins links**: `set_successor` overwrites and returns the
//!   previous successor

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store};
