//! Ethereum-style personal-message signing of canonical attestation
//! messages.
//!
//! The canonical message is prefixed with `"\x19Ethereum Signed Message:\n"`
//! plus its byte length, hashed with Keccak-256, and signed with secp256k1
//! ECDSA producing a recoverable signature. Verification recovers the
//! public key from the signature and compares the derived address, so
//! verifiers need only the canonical message, the signature, and the
//! signer's public address — never the private key.

use chrono::{SecondsFormat, Utc};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use tracing::debug;

use gearoracle_core::{AttestationError, ContextSource};

use crate::canonical::canonical_message;
use crate::hashing::context_hashes;

/// A cryptographically signed attestation of an AI response.
///
/// Created once per chat turn, never mutated. Stores everything an
/// independent verifier needs: the signed fields, the signature, and the
/// signer's public address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeAttestation {
    pub query: String,
    pub response: String,
    /// Sorted ascending SHA-256 hex digests of each source's content.
    pub context_hashes: Vec<String>,
    /// ISO-8601 UTC timestamp with offset, e.g. "2025-06-01T12:00:00.000000+00:00".
    pub timestamp: String,
    /// Hex-encoded 65-byte recoverable signature (0x + r || s || v).
    pub signature: String,
    /// The signer's Ethereum address (0x-prefixed, lowercase).
    pub signer_address: String,
}

impl KnowledgeAttestation {
    /// Reconstruct the canonical message this attestation signed.
    pub fn canonical_message(&self) -> String {
        canonical_message(
            &self.timestamp,
            &self.query,
            &self.response,
            &self.context_hashes,
        )
    }

    /// Verify the signature against the embedded signer address.
    pub fn verify(&self) -> Result<(), AttestationError> {
        verify_message(
            &self.canonical_message(),
            &self.signature,
            &self.signer_address,
        )
    }
}

/// Signs canonical attestation messages with a configured secp256k1 key.
///
/// Construction fails if the key is absent or malformed; callers surface
/// that at startup rather than on the first request.
#[derive(Debug)]
pub struct AttestationSigner {
    signing_key: SigningKey,
    address: String,
}

impl AttestationSigner {
    /// Build a signer from a hex-encoded private key (0x prefix optional).
    pub fn from_hex_key(key: Option<&str>) -> Result<Self, AttestationError> {
        let key = key.ok_or(AttestationError::MissingKey)?;
        let bytes = hex::decode(key.trim().trim_start_matches("0x"))
            .map_err(|e| AttestationError::MalformedKey(e.to_string()))?;
        let signing_key = SigningKey::from_slice(&bytes)
            .map_err(|e| AttestationError::MalformedKey(e.to_string()))?;
        let address = derive_address(signing_key.verifying_key());
        Ok(Self {
            signing_key,
            address,
        })
    }

    /// The signer's public Ethereum address (0x-prefixed, lowercase).
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Create an attestation for a chat turn, timestamped now.
    pub fn attest(
        &self,
        query: &str,
        response: &str,
        sources: &[ContextSource],
    ) -> Result<KnowledgeAttestation, AttestationError> {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false);
        self.attest_at(&timestamp, query, response, sources)
    }

    /// Create an attestation with an explicit timestamp.
    ///
    /// `attest` delegates here; tests use it directly for reproducibility.
    pub fn attest_at(
        &self,
        timestamp: &str,
        query: &str,
        response: &str,
        sources: &[ContextSource],
    ) -> Result<KnowledgeAttestation, AttestationError> {
        let hashes = context_hashes(sources);
        let message = canonical_message(timestamp, query, response, &hashes);
        let signature = self.sign_message(&message)?;

        debug!(
            sources = sources.len(),
            signer = %self.address,
            "attestation signed"
        );

        Ok(KnowledgeAttestation {
            query: query.to_string(),
            response: response.to_string(),
            context_hashes: hashes,
            timestamp: timestamp.to_string(),
            signature,
            signer_address: self.address.clone(),
        })
    }

    /// Sign an arbitrary message with the personal-message scheme, returning
    /// the hex-encoded 65-byte recoverable signature.
    pub fn sign_message(&self, message: &str) -> Result<String, AttestationError> {
        let digest = personal_message_hash(message);
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(&digest)
            .map_err(|e| AttestationError::SigningFailed(e.to_string()))?;

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = 27 + recovery_id.to_byte();
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

/// Verify a personal-message signature against an expected signer address.
///
/// Recovers the public key from (message digest, signature) and compares
/// the derived address case-insensitively.
pub fn verify_message(
    message: &str,
    signature_hex: &str,
    expected_address: &str,
) -> Result<(), AttestationError> {
    let bytes = hex::decode(signature_hex.trim().trim_start_matches("0x"))
        .map_err(|e| AttestationError::MalformedSignature(e.to_string()))?;
    if bytes.len() != 65 {
        return Err(AttestationError::MalformedSignature(format!(
            "expected 65 bytes, got {}",
            bytes.len()
        )));
    }

    let signature = Signature::from_slice(&bytes[..64])
        .map_err(|e| AttestationError::MalformedSignature(e.to_string()))?;
    let v = bytes[64];
    let recovery_byte = if v >= 27 { v - 27 } else { v };
    let recovery_id = RecoveryId::from_byte(recovery_byte).ok_or_else(|| {
        AttestationError::MalformedSignature(format!("invalid recovery byte {v}"))
    })?;

    let digest = personal_message_hash(message);
    let recovered = VerifyingKey::recover_from_prehash(&digest, &signature, recovery_id)
        .map_err(|_| AttestationError::VerificationFailed {
            expected: expected_address.to_string(),
        })?;

    let recovered_address = derive_address(&recovered);
    if recovered_address.eq_ignore_ascii_case(expected_address) {
        Ok(())
    } else {
        Err(AttestationError::VerificationFailed {
            expected: expected_address.to_string(),
        })
    }
}

/// Keccak-256 digest of the EIP-191 prefixed message bytes.
fn personal_message_hash(message: &str) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(b"\x19Ethereum Signed Message:\n");
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message.as_bytes());
    hasher.finalize().into()
}

/// Derive the Ethereum address from a public key: last 20 bytes of the
/// Keccak-256 digest of the uncompressed point (without the 0x04 tag).
fn derive_address(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&digest[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Throwaway key used only in tests.
    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn signer() -> AttestationSigner {
        AttestationSigner::from_hex_key(Some(TEST_KEY)).unwrap()
    }

    #[test]
    fn missing_key_fails_loudly() {
        let err = AttestationSigner::from_hex_key(None).unwrap_err();
        assert!(matches!(err, AttestationError::MissingKey));
    }

    #[test]
    fn malformed_key_fails_loudly() {
        let err = AttestationSigner::from_hex_key(Some("not-hex")).unwrap_err();
        assert!(matches!(err, AttestationError::MalformedKey(_)));

        let err = AttestationSigner::from_hex_key(Some("deadbeef")).unwrap_err();
        assert!(matches!(err, AttestationError::MalformedKey(_)));
    }

    #[test]
    fn key_accepts_0x_prefix() {
        let a = AttestationSigner::from_hex_key(Some(TEST_KEY)).unwrap();
        let b = AttestationSigner::from_hex_key(Some(&format!("0x{TEST_KEY}"))).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn address_is_hex_with_prefix() {
        let s = signer();
        assert!(s.address().starts_with("0x"));
        assert_eq!(s.address().len(), 42);
    }

    #[test]
    fn signature_roundtrips_verification() {
        let s = signer();
        let message = "GearOracle Knowledge Attestation v1\nTimestamp: t\nQuery: q\nResponse: r\nContext Hashes: ";
        let sig = s.sign_message(message).unwrap();
        assert!(sig.starts_with("0x"));
        assert_eq!(sig.len(), 2 + 130);
        verify_message(message, &sig, s.address()).unwrap();
    }

    #[test]
    fn mutated_message_fails_verification() {
        let s = signer();
        let message = "original answer";
        let sig = s.sign_message(message).unwrap();
        let err = verify_message("original answeR", &sig, s.address()).unwrap_err();
        assert!(matches!(err, AttestationError::VerificationFailed { .. }));
    }

    #[test]
    fn wrong_address_fails_verification() {
        let s = signer();
        let sig = s.sign_message("msg").unwrap();
        let err = verify_message(
            "msg",
            &sig,
            "0x0000000000000000000000000000000000000000",
        )
        .unwrap_err();
        assert!(matches!(err, AttestationError::VerificationFailed { .. }));
    }

    #[test]
    fn truncated_signature_rejected() {
        let err = verify_message("msg", "0xdeadbeef", "0xabc").unwrap_err();
        assert!(matches!(err, AttestationError::MalformedSignature(_)));
    }

    #[test]
    fn attestation_roundtrip() {
        let s = signer();
        let sources = vec![
            ContextSource::manual("accord.pdf", "Tire pressure: 32 psi front, 30 psi rear"),
            ContextSource::manual("accord.pdf", "Check pressure monthly when tires are cold"),
        ];

        let att = s
            .attest_at(
                "2025-06-01T12:00:00.000000+00:00",
                "What is the tire pressure?",
                "32 psi front, 30 psi rear (accord.pdf).",
                &sources,
            )
            .unwrap();

        assert_eq!(att.context_hashes.len(), 2);
        assert!(att.context_hashes[0] <= att.context_hashes[1]);
        assert_eq!(att.signer_address, s.address());
        att.verify().unwrap();
    }

    #[test]
    fn empty_context_attestation_is_valid() {
        let s = signer();
        let att = s
            .attest_at(
                "2025-06-01T12:00:00.000000+00:00",
                "What is the tire pressure?",
                "That information is not available in my current knowledge base.",
                &[],
            )
            .unwrap();
        assert!(att.context_hashes.is_empty());
        att.verify().unwrap();
    }

    #[test]
    fn tampered_attestation_field_fails() {
        let s = signer();
        let mut att = s
            .attest_at("2025-06-01T12:00:00.000000+00:00", "q", "r", &[])
            .unwrap();
        att.response = "forged response".into();
        assert!(att.verify().is_err());
    }

    #[test]
    fn attest_uses_rfc3339_utc_timestamp() {
        let s = signer();
        let att = s.attest("q", "r", &[]).unwrap();
        assert!(att.timestamp.ends_with("+00:00"));
        assert!(chrono::DateTime::parse_from_rfc3339(&att.timestamp).is_ok());
        att.verify().unwrap();
    }

    #[test]
    fn attestation_serializes_for_api() {
        let s = signer();
        let att = s
            .attest_at("2025-06-01T12:00:00.000000+00:00", "q", "r", &[])
            .unwrap();
        let json = serde_json::to_string(&att).unwrap();
        assert!(json.contains("context_hashes"));
        assert!(json.contains("signer_address"));
        let parsed: KnowledgeAttestation = serde_json::from_str(&json).unwrap();
        parsed.verify().unwrap();
    }
}
