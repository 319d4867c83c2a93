//! Context hashing.
//!
//! Each retrieved source is identified in the attestation by the SHA-256
//! digest of its `content` field. The digest list is sorted ascending so
//! the result is independent of retrieval order; duplicates are preserved
//! so the list length always equals the source count.

use gearoracle_core::ContextSource;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of a single source's content (UTF-8 bytes).
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// The lexicographically sorted list of content digests for a context set.
///
/// Computed identically by the signer and by any verifier reconstructing
/// the signed message — non-determinism here breaks verifiability.
pub fn context_hashes(sources: &[ContextSource]) -> Vec<String> {
    let mut hashes: Vec<String> = sources.iter().map(|s| content_hash(&s.content)).collect();
    hashes.sort();
    hashes
}
