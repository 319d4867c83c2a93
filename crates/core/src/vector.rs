//! VectorStore trait — the abstraction over the external vector database.
//!
//! The store is consumed as an opaque function: (vector, top_k, equality
//! filters) → ranked matches. Ingestion uses the same trait to upsert
//! chunked records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::VectorStoreError;
use crate::source::ScoredMatch;

/// Equality filters applied to a similarity query.
///
/// Every retrieval is scoped to exactly one user and one vehicle so that a
/// user can never pull excerpts from another user's manuals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataFilter {
    pub user_id: String,
    pub vehicle_id: String,
}

/// A record to upsert into the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertRecord {
    /// Stable record id, e.g. "<file>-<start_word>".
    pub id: String,

    /// The embedding vector.
    pub values: Vec<f32>,

    /// Metadata stored alongside the vector (scope ids, source text,
    /// provenance).
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// The vector store trait.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// A human-readable name for this store (e.g. "pinecone").
    fn name(&self) -> &str;

    /// Nearest-neighbor query, filtered to records matching `filter`
    /// exactly. Returns up to `top_k` matches ranked by similarity; an
    /// empty result is not an error.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &MetadataFilter,
    ) -> std::result::Result<Vec<ScoredMatch>, VectorStoreError>;

    /// Upsert a batch of records.
    async fn upsert(
        &self,
        records: Vec<UpsertRecord>,
    ) -> std::result::Result<(), VectorStoreError>;
}
