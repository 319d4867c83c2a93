//! `gearoracle verify` — Verify a saved knowledge attestation.
//!
//! Reads an attestation JSON file, reconstructs the canonical message, and
//! checks that the signature recovers to the embedded signer address (or to
//! an explicitly expected one).

use std::path::Path;

use gearoracle_attestation::KnowledgeAttestation;

pub fn run(file: &Path, expected_address: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let attestation: KnowledgeAttestation = serde_json::from_str(&content)
        .map_err(|e| format!("Not a valid attestation file: {e}"))?;

    if let Some(expected) = expected_address {
        if !attestation.signer_address.eq_ignore_ascii_case(expected) {
            return Err(format!(
                "Signer address mismatch: attestation carries {}, expected {expected}",
                attestation.signer_address
            )
            .into());
        }
    }

    attestation.verify()?;

    println!("Attestation VALID");
    println!("   Signer:    {}", attestation.signer_address);
    println!("   Timestamp: {}", attestation.timestamp);
    println!("   Query:     {}", attestation.query);
    println!("   Sources:   {} context hash(es)", attestation.context_hashes.len());
    Ok(())
}
