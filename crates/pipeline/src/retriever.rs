//! Context retrieval.
//!
//! Wraps the vector store query, applying per-user/per-vehicle scope
//! filters. An empty result is not an error: the pipeline proceeds with
//! empty context and the model states when it lacks information.

use std::sync::Arc;

use gearoracle_core::error::VectorStoreError;
use gearoracle_core::source::ContextSource;
use gearoracle_core::vector::{MetadataFilter, VectorStore};
use tracing::{debug, warn};

/// Retrieves manual excerpts scoped to one user and one vehicle.
pub struct ContextRetriever {
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl ContextRetriever {
    pub fn new(store: Arc<dyn VectorStore>, top_k: usize) -> Self {
        Self { store, top_k }
    }

    /// Query the store with the given embedding and convert matches into
    /// `ContextSource` records, ranked by similarity.
    pub async fn retrieve(
        &self,
        embedding: &[f32],
        filter: &MetadataFilter,
    ) -> Result<Vec<ContextSource>, VectorStoreError> {
        let matches = self.store.query(embedding, self.top_k, filter).await?;

        if matches.is_empty() {
            warn!(
                user_id = %filter.user_id,
                vehicle_id = %filter.vehicle_id,
                "No context found for query"
            );
            return Ok(Vec::new());
        }

        debug!(count = matches.len(), "Context retrieved");

        Ok(matches
            .into_iter()
            .map(|m| m.into_context_source())
            .collect())
    }
}
