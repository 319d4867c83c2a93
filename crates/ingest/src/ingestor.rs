//! Document ingestion.
//!
//! Chunks a document, embeds the chunks in batches, and upserts the
//! resulting records with the scope metadata (`user_id`, `vehicle_id`)
//! that retrieval filters on. A failed batch aborts the run; already
//! upserted batches stay in the index, and re-running the same file
//! overwrites them because chunk ids are deterministic.

use std::sync::Arc;

use gearoracle_core::error::{ProviderError, VectorStoreError};
use gearoracle_core::provider::{EmbeddingRequest, Provider};
use gearoracle_core::vector::{UpsertRecord, VectorStore};
use thiserror::Error;
use tracing::{debug, info};

use crate::chunker::{chunk_text, Chunk};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("embedding chunks failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("upserting records failed: {0}")]
    Upsert(#[source] VectorStoreError),

    #[error("embedding count mismatch: {expected} chunks, {actual} vectors")]
    EmbeddingCountMismatch { expected: usize, actual: usize },
}

/// What an ingestion run produced.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub source_file: String,
    pub chunks: usize,
    pub batches: usize,
}

/// Chunks, embeds, and indexes documents for one user/vehicle scope.
pub struct Ingestor {
    provider: Arc<dyn Provider>,
    store: Arc<dyn VectorStore>,
    embedding_model: String,
    chunk_size: usize,
    chunk_overlap: usize,
    batch_size: usize,
}

impl Ingestor {
    pub fn new(
        provider: Arc<dyn Provider>,
        store: Arc<dyn VectorStore>,
        embedding_model: impl Into<String>,
        chunk_size: usize,
        chunk_overlap: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            provider,
            store,
            embedding_model: embedding_model.into(),
            chunk_size,
            chunk_overlap,
            batch_size,
        }
    }

    /// Ingest one document's text under the given scope.
    pub async fn ingest(
        &self,
        user_id: &str,
        vehicle_id: &str,
        source_file: &str,
        text: &str,
    ) -> Result<IngestReport, IngestError> {
        let chunks = chunk_text(source_file, text, self.chunk_size, self.chunk_overlap);
        if chunks.is_empty() {
            info!(source_file, "Document produced no chunks, nothing to index");
            return Ok(IngestReport {
                source_file: source_file.to_string(),
                chunks: 0,
                batches: 0,
            });
        }

        let total = chunks.len();
        let mut batches = 0;
        for batch in chunks.chunks(self.batch_size) {
            let records = self.embed_batch(user_id, vehicle_id, source_file, batch).await?;
            self.store
                .upsert(records)
                .await
                .map_err(IngestError::Upsert)?;
            batches += 1;
            debug!(source_file, batch = batches, size = batch.len(), "Batch indexed");
        }

        info!(source_file, chunks = total, batches, "Document indexed");
        Ok(IngestReport {
            source_file: source_file.to_string(),
            chunks: total,
            batches,
        })
    }

    async fn embed_batch(
        &self,
        user_id: &str,
        vehicle_id: &str,
        source_file: &str,
        batch: &[Chunk],
    ) -> Result<Vec<UpsertRecord>, IngestError> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            inputs: batch.iter().map(|c| c.text.clone()).collect(),
        };
        let response = self
            .provider
            .embed(request)
            .await
            .map_err(IngestError::Embedding)?;

        if response.embeddings.len() != batch.len() {
            return Err(IngestError::EmbeddingCountMismatch {
                expected: batch.len(),
                actual: response.embeddings.len(),
            });
        }

        Ok(batch
            .iter()
            .zip(response.embeddings)
            .map(|(chunk, values)| {
                let mut metadata = serde_json::Map::new();
                metadata.insert("user_id".into(), serde_json::json!(user_id));
                metadata.insert("vehicle_id".into(), serde_json::json!(vehicle_id));
                metadata.insert("source_file".into(), serde_json::json!(source_file));
                metadata.insert("start_word".into(), serde_json::json!(chunk.start_word));
                metadata.insert("chunk_hash".into(), serde_json::json!(chunk.hash));
                metadata.insert("text".into(), serde_json::json!(chunk.text));
                UpsertRecord {
                    id: chunk.id.clone(),
                    values,
                    metadata,
                }
            })
            .collect())
    }
}
