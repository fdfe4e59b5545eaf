//! # Docreg Testkit
//!
//! Testing utilities for the document registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: A registry with a known admin and a ticking height counter
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust
//! use docreg_testkit::fixtures::{content_hash, principal, document_id, TestFixture};
//!
//! let mut fixture = TestFixture::new();
//! fixture.register("U1", "D1", "HASH_A").unwrap();
//! fixture
//!     .registry
//!     .verify(&principal("U1"), &document_id("D1"), &content_hash("HASH_A"))
//!     .unwrap();
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use docreg_testkit::generators::RegistrationParams;
//!
//! proptest! {
//!     #[test]
//!     fn registration_roundtrips(params: RegistrationParams) {
//!         // ...
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{content_hash, document_id, init_tracing, principal, TestFixture};
pub use generators::RegistrationParams;
