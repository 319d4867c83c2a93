//! Canonical message construction.
//!
//! The signed message is a pure function of (timestamp, query, response,
//! context_hashes). Its exact byte layout is a compatibility contract:
//! signer and verifier must produce the identical byte sequence, or valid
//! signatures fail verification without indicating tampering.
//!
//! Pinned format — exactly five lines joined by `\n`, no leading or
//! trailing newline:
//!
//! ```text
//! GearOracle Knowledge Attestation v1
//! Timestamp: <timestamp>
//! Query: <query>
//! Response: <response>
//! Context Hashes: <hash1,hash2,...>
//! ```
//!
//! An empty hash list leaves nothing after the final space (the last line
//! is `Context Hashes: `).

/// Constant label identifying the attestation scheme and version.
pub const ATTESTATION_LABEL: &str = "GearOracle Knowledge Attestation v1";

/// Build the canonical message that gets signed.
pub fn canonical_message(
    timestamp: &str,
    query: &str,
    response: &str,
    context_hashes: &[String],
) -> String {
    format!(
        "{ATTESTATION_LABEL}\nTimestamp: {timestamp}\nQuery: {query}\nResponse: {response}\nContext Hashes: {}",
        context_hashes.join(",")
    )
}
