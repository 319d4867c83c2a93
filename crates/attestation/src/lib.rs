//! # GearOracle Attestation
//!
//! Builds and verifies knowledge attestations: signed records binding a
//! query, its answer, and hashes of the supporting context, so that an
//! independent party can verify that a specific answer was produced from
//! specific sources at a specific time.
//!
//! The canonical message format and the hash ordering defined here are a
//! byte-for-byte compatibility surface. Any verifier must reconstruct the
//! signed message identically; see [`canonical::canonical_message`].

pub mod canonical;
pub mod hashing;
pub mod signer;

pub use canonical::{canonical_message, ATTESTATION_LABEL};
pub use hashing::{content_hash, context_hashes};
pub use signer::{AttestationSigner, KnowledgeAttestation};
