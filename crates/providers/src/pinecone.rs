//! Pinecone-style vector store client.
//!
//! Talks to a serverless index over its data-plane REST surface:
//! `POST /query` for filtered nearest-neighbor search and
//! `POST /vectors/upsert` for batch writes.

use gearoracle_core::error::VectorStoreError;
use gearoracle_core::source::ScoredMatch;
use gearoracle_core::vector::{MetadataFilter, UpsertRecord, VectorStore};
use serde::Deserialize;
use tracing::{debug, warn};

/// A Pinecone-style vector store.
#[derive(Debug)]
pub struct PineconeStore {
    name: String,
    index_host: String,
    api_key: String,
    client: reqwest::Client,
}

impl PineconeStore {
    /// Create a new store client. Fails if the key or index host is missing.
    pub fn new(
        index_host: impl Into<String>,
        api_key: Option<&str>,
    ) -> Result<Self, VectorStoreError> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                VectorStoreError::AuthenticationFailed("pinecone: missing API key".into())
            })?;
        let index_host = index_host.into().trim_end_matches('/').to_string();
        if index_host.is_empty() {
            return Err(VectorStoreError::IndexNotFound(
                "pinecone: index_host is not configured".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| VectorStoreError::Network(e.to_string()))?;

        Ok(Self {
            name: "pinecone".into(),
            index_host,
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Build from app configuration.
    pub fn from_config(
        config: &gearoracle_config::PineconeConfig,
    ) -> Result<Self, VectorStoreError> {
        Self::new(&config.index_host, config.api_key.as_deref())
    }

    /// Exact-match filter in the store's query syntax.
    fn filter_json(filter: &MetadataFilter) -> serde_json::Value {
        serde_json::json!({
            "user_id": { "$eq": filter.user_id },
            "vehicle_id": { "$eq": filter.vehicle_id },
        })
    }
}

#[async_trait::async_trait]
impl VectorStore for PineconeStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: &MetadataFilter,
    ) -> std::result::Result<Vec<ScoredMatch>, VectorStoreError> {
        let url = format!("{}/query", self.index_host);

        let body = serde_json::json!({
            "vector": vector,
            "topK": top_k,
            "filter": Self::filter_json(filter),
            "includeMetadata": true,
        });

        debug!(top_k, user_id = %filter.user_id, vehicle_id = %filter.vehicle_id, "Vector query");

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorStoreError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(VectorStoreError::AuthenticationFailed(
                "Invalid vector store API key".into(),
            ));
        }
        if status == 404 {
            return Err(VectorStoreError::IndexNotFound(self.index_host.clone()));
        }
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Vector store query error");
            return Err(VectorStoreError::QueryFailed(format!(
                "status {status}: {body}"
            )));
        }

        let api_resp: QueryApiResponse = response
            .json()
            .await
            .map_err(|e| VectorStoreError::QueryFailed(format!("parse error: {e}")))?;

        Ok(api_resp
            .matches
            .into_iter()
            .map(|m| ScoredMatch {
                id: m.id,
                score: m.score.unwrap_or_default(),
                metadata: m.metadata.unwrap_or_default(),
            })
            .collect())
    }

    async fn upsert(
        &self,
        records: Vec<UpsertRecord>,
    ) -> std::result::Result<(), VectorStoreError> {
        let url = format!("{}/vectors/upsert", self.index_host);

        debug!(count = records.len(), "Vector upsert");

        let body = serde_json::json!({ "vectors": records });

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| VectorStoreError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return Err(VectorStoreError::AuthenticationFailed(
                "Invalid vector store API key".into(),
            ));
        }
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            return Err(VectorStoreError::UpsertFailed(format!(
                "status {status}: {body}"
            )));
        }

        Ok(())
    }
}

// --- Pinecone API types (internal) ---

#[derive(Debug, Deserialize)]
struct QueryApiResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Debug, Deserialize)]
struct ApiMatch {
    id: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}
