//! # GearOracle Core
//!
//! Domain types, traits, and error definitions for the GearOracle knowledge
//! oracle. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (LLM provider, vector store) is defined as a
//! trait here. Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod provider;
pub mod source;
pub mod vector;

// Re-export key types at crate root for ergonomics
pub use error::{AttestationError, Error, ProviderError, Result, VectorStoreError};
pub use provider::{ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, Provider};
pub use source::{ContextSource, ScoredMatch};
pub use vector::{MetadataFilter, UpsertRecord, VectorStore};
