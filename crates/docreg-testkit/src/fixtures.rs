//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use docreg::{Registry, RegistryConfig};
use docreg_core::{CallContext, ContentHash, DocumentId, Height, Principal};
use docreg_store::{MemoryStore, Store};

/// Admin identity every fixture starts with.
pub const ADMIN: &str = "ST1ADMIN";

/// Height every fixture starts at.
pub const START_HEIGHT: u64 = 1000;

/// Parse a principal, panicking on malformed test input.
pub fn principal(name: &str) -> Principal {
    Principal::new(name).expect("test principal")
}

/// Parse a document id, panicking on malformed test input.
pub fn document_id(id: &str) -> DocumentId {
    DocumentId::new(id).expect("test document id")
}

/// Deterministic content hash for a label such as `"HASH_A"`.
///
/// The registry never hashes content itself; tests stand in for the caller
/// that does.
pub fn content_hash(label: &str) -> ContentHash {
    ContentHash::from_bytes(*blake3::hash(label.as_bytes()).as_bytes())
}

/// Install a fmt subscriber writing through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
        .try_init();
}

/// A registry with a known admin and a height counter that ticks on every
/// context handed out.
pub struct TestFixture<S: Store = MemoryStore> {
    pub registry: Registry<S>,
    height: u64,
}

impl TestFixture<MemoryStore> {
    /// Fixture over a fresh memory store with [`ADMIN`] as admin.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::new(principal(ADMIN)))
    }

    /// Fixture over a fresh memory store with a custom config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl<S: Store> TestFixture<S> {
    /// Fixture over an existing store.
    pub fn with_store(store: S, config: RegistryConfig) -> Self {
        Self {
            registry: Registry::open(store, config).expect("open test registry"),
            height: START_HEIGHT,
        }
    }

    /// Call context for `caller` at the next height.
    pub fn ctx(&mut self, caller: &str) -> CallContext {
        let ctx = CallContext::new(principal(caller), Height(self.height));
        self.height += 1;
        ctx
    }

    /// Call context for the current admin.
    pub fn admin_ctx(&mut self) -> CallContext {
        let admin = self.registry.admin().as_str().to_owned();
        self.ctx(&admin)
    }

    /// Register a labelled hash under (owner, id) with no optional fields.
    pub fn register(&mut self, owner: &str, id: &str, label: &str) -> docreg::Result<()> {
        let ctx = self.ctx(owner);
        self.registry
            .register(&ctx, document_id(id), content_hash(label), None, None)
    }

    /// Link two labelled hashes as the admin.
    pub fn link(&mut self, old: &str, new: &str) -> docreg::Result<()> {
        let ctx = self.admin_ctx();
        self.registry
            .link_version(&ctx, content_hash(old), content_hash(new))
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}
