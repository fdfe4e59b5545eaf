//! Proptest generators for property-based testing.

use proptest::prelude::*;

use docreg_core::{ContentHash, DocumentId, Height, Principal};

/// Generate a random non-null ContentHash.
pub fn content_hash() -> impl Strategy<Value = ContentHash> {
    any::<[u8; 32]>()
        .prop_filter("null hash", |bytes| bytes != &[0u8; 32])
        .prop_map(ContentHash::from_bytes)
}

/// Generate a principal in the style of `ST2USER`.
pub fn principal() -> impl Strategy<Value = Principal> {
    "S[TP][0-9A-Z]{1,20}".prop_map(|s| Principal::new(s).expect("generated principal"))
}

/// Generate a document id.
pub fn document_id() -> impl Strategy<Value = DocumentId> {
    "[a-z0-9][a-z0-9 ._-]{0,31}".prop_map(|s| DocumentId::new(s).expect("generated document id"))
}

/// Generate a height.
pub fn height() -> impl Strategy<Value = Height> {
    any::<u64>().prop_map(Height)
}

/// Generate an optional jurisdiction tag.
pub fn jurisdiction() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[A-Z]{2}")
}

/// Generate an optional metadata locator.
pub fn metadata_locator() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("(ipfs|ar|https)://[a-z0-9]{4,24}")
}

/// Parameters for one registration.
#[derive(Debug, Clone)]
pub struct RegistrationParams {
    pub owner: Principal,
    pub document_id: DocumentId,
    pub hash: ContentHash,
    pub height: Height,
    pub jurisdiction: Option<String>,
    pub metadata_locator: Option<String>,
}

impl Arbitrary for RegistrationParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            principal(),
            document_id(),
            content_hash(),
            height(),
            jurisdiction(),
            metadata_locator(),
        )
            .prop_map(
                |(owner, document_id, hash, height, jurisdiction, metadata_locator)| {
                    RegistrationParams {
                        owner,
                        document_id,
                        hash,
                        height,
                        jurisdiction,
                        metadata_locator,
                    }
                },
            )
            .boxed()
    }
}

/// Generate `len` distinct non-null hashes, in order, for building chains.
pub fn distinct_hashes(len: usize) -> impl Strategy<Value = Vec<ContentHash>> {
    prop::collection::hash_set(content_hash(), len).prop_map(|set| set.into_iter().collect())
}
