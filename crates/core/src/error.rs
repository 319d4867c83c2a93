//! Error types for the GearOracle domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all GearOracle operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Vector store errors ---
    #[error("Vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    // --- Attestation errors ---
    #[error("Attestation error: {0}")]
    Attestation(#[from] AttestationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider returned no output")]
    EmptyResponse,

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ProviderError {
    /// Whether this failure is transient (retryable upstream) as opposed to
    /// a configuration fault that will not resolve on its own.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::RateLimited { .. }
                | ProviderError::Timeout(_)
                | ProviderError::Network(_)
        )
    }
}

#[derive(Debug, Clone, Error)]
pub enum VectorStoreError {
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Upsert failed: {0}")]
    UpsertFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    #[error("Network error: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum AttestationError {
    #[error("Signing key is missing")]
    MissingKey,

    #[error("Signing key is malformed: {0}")]
    MalformedKey(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Signature is malformed: {0}")]
    MalformedSignature(String),

    #[error("Signature does not verify against address {expected}")]
    VerificationFailed { expected: String },
}
