//! Chat and health endpoints.
//!
//! The chat handler validates the request, runs the pipeline, and shapes
//! the outcome into the wire response. Validation failures are 400s with a
//! reason; any pipeline failure is logged in full and returned as a
//! generic 500.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use gearoracle_attestation::KnowledgeAttestation;
use gearoracle_core::source::ContextSource;
use gearoracle_pipeline::ChatTurn;

use crate::SharedState;

/// Longest accepted chat message, in characters.
const MAX_MESSAGE_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct ChatApiRequest {
    pub user_id: String,
    pub vehicle_id: String,
    pub message: String,

    /// Accepted for client-side threading; not interpreted server-side.
    #[serde(default)]
    pub thread_id: Option<String>,

    /// Accepted for future on-chain delivery; not interpreted server-side.
    #[serde(default)]
    pub wallet_address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatApiResponse {
    pub success: bool,
    pub response_text: String,
    /// Full retrieved sources, content included, so callers can recompute
    /// the attestation's context hashes themselves.
    pub sources: Vec<ContextSource>,
    pub attestation: KnowledgeAttestation,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub signer_address: String,
}

pub async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        service: state.service_name.clone(),
        signer_address: state.signer_address.clone(),
    })
}

pub async fn chat_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatApiRequest>,
) -> Result<Json<ChatApiResponse>, (StatusCode, Json<ErrorResponse>)> {
    validate(&request)?;

    let turn = ChatTurn {
        user_id: request.user_id,
        vehicle_id: request.vehicle_id,
        message: request.message,
    };

    info!(user_id = %turn.user_id, vehicle_id = %turn.vehicle_id, "Chat request received");

    let outcome = state.pipeline.handle(&turn).await.map_err(|e| {
        error!(
            stage = e.stage(),
            transient = e.is_transient(),
            error = %e,
            "Chat pipeline failed"
        );
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".into(),
            }),
        )
    })?;

    Ok(Json(ChatApiResponse {
        success: true,
        response_text: outcome.response_text,
        sources: outcome.sources,
        attestation: outcome.attestation,
    }))
}

fn validate(request: &ChatApiRequest) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let reject = |msg: &str| {
        Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: msg.into() }),
        ))
    };

    if request.user_id.trim().is_empty() {
        return reject("user_id must not be empty");
    }
    if request.vehicle_id.trim().is_empty() {
        return reject("vehicle_id must not be empty");
    }
    if request.message.trim().is_empty() {
        return reject("message must not be empty");
    }
    if request.message.chars().count() > MAX_MESSAGE_CHARS {
        return reject("message exceeds maximum length of 2000 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_router, GatewayState};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    use gearoracle_attestation::AttestationSigner;
    use gearoracle_core::error::{ProviderError, VectorStoreError};
    use gearoracle_core::provider::{
        ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse, Provider,
    };
    use gearoracle_core::source::ScoredMatch;
    use gearoracle_core::vector::{MetadataFilter, UpsertRecord, VectorStore};
    use gearoracle_pipeline::{ChatPipeline, ContextRetriever, ResponseGenerator};

    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    struct StubProvider {
        fail: bool,
    }

    #[async_trait::async_trait]
    impl Provider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            if self.fail {
                return Err(ProviderError::Network("unreachable".into()));
            }
            Ok(EmbeddingResponse {
                embeddings: vec![vec![0.1; 4]; request.inputs.len()],
                model: request.model,
                usage: None,
            })
        }

        async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            Ok(ChatResponse {
                content: "Recommended pressure is 32 psi (accord.pdf, p. 12).".into(),
                model: request.model,
                usage: None,
            })
        }
    }

    struct StubStore;

    #[async_trait::async_trait]
    impl VectorStore for StubStore {
        fn name(&self) -> &str {
            "stub"
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
            _filter: &MetadataFilter,
        ) -> Result<Vec<ScoredMatch>, VectorStoreError> {
            let mut metadata = serde_json::Map::new();
            metadata.insert("text".into(), serde_json::json!("Tire pressure: 32 psi"));
            metadata.insert("source_file".into(), serde_json::json!("accord.pdf"));
            metadata.insert("page_number".into(), serde_json::json!(12));
            Ok(vec![ScoredMatch {
                id: "accord.pdf-0".into(),
                score: 0.91,
                metadata,
            }])
        }

        async fn upsert(&self, _records: Vec<UpsertRecord>) -> Result<(), VectorStoreError> {
            Ok(())
        }
    }

    fn app(fail_provider: bool) -> axum::Router {
        let provider: Arc<dyn Provider> = Arc::new(StubProvider {
            fail: fail_provider,
        });
        let store: Arc<dyn VectorStore> = Arc::new(StubStore);
        let signer = Arc::new(AttestationSigner::from_hex_key(Some(TEST_KEY)).unwrap());
        let signer_address = signer.address().to_string();
        let pipeline = ChatPipeline::new(
            provider.clone(),
            "text-embedding-3-small",
            ContextRetriever::new(store, 5),
            ResponseGenerator::new(provider, "gpt-4o-mini", 0.2),
            signer,
        );
        build_router(Arc::new(GatewayState {
            service_name: "GearOracle Chat Service".into(),
            signer_address,
            pipeline,
        }))
    }

    fn chat_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/chat")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_service_and_signer() {
        let response = app(false)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "GearOracle Chat Service");
        assert!(json["signer_address"].as_str().unwrap().starts_with("0x"));
    }

    #[tokio::test]
    async fn chat_returns_answer_sources_and_attestation() {
        let response = app(false)
            .oneshot(chat_request(serde_json::json!({
                "user_id": "u1",
                "vehicle_id": "v1",
                "message": "What is the tire pressure?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert!(json["response_text"].as_str().unwrap().contains("32 psi"));
        assert_eq!(json["sources"][0]["source_name"], "accord.pdf");
        assert_eq!(json["sources"][0]["metadata"]["page"], 12);
        assert_eq!(json["attestation"]["query"], "What is the tire pressure?");
        assert_eq!(json["attestation"]["context_hashes"].as_array().unwrap().len(), 1);

        let attestation: KnowledgeAttestation =
            serde_json::from_value(json["attestation"].clone()).unwrap();
        attestation.verify().unwrap();
    }

    #[tokio::test]
    async fn sources_carry_content_for_hash_recomputation() {
        let response = app(false)
            .oneshot(chat_request(serde_json::json!({
                "user_id": "u1",
                "vehicle_id": "v1",
                "message": "What is the tire pressure?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        // Every ContextSource field is on the wire, content included.
        let source = &json["sources"][0];
        assert_eq!(source["source_type"], "manual");
        assert_eq!(source["source_name"], "accord.pdf");
        assert_eq!(source["content"], "Tire pressure: 32 psi");
        assert!(source["metadata"]["score"].as_f64().unwrap() > 0.9);

        // The returned texts reproduce the attestation's context hashes.
        let recomputed = gearoracle_attestation::content_hash(
            source["content"].as_str().unwrap(),
        );
        assert_eq!(json["attestation"]["context_hashes"][0], recomputed);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let response = app(false)
            .oneshot(chat_request(serde_json::json!({
                "user_id": "u1",
                "vehicle_id": "v1",
                "message": "   "
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "message must not be empty");
    }

    #[tokio::test]
    async fn oversized_message_is_rejected() {
        let response = app(false)
            .oneshot(chat_request(serde_json::json!({
                "user_id": "u1",
                "vehicle_id": "v1",
                "message": "x".repeat(2001)
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_scope_ids_are_rejected() {
        let response = app(false)
            .oneshot(chat_request(serde_json::json!({
                "user_id": " ",
                "vehicle_id": "v1",
                "message": "q"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pipeline_failure_is_a_generic_500() {
        let response = app(true)
            .oneshot(chat_request(serde_json::json!({
                "user_id": "u1",
                "vehicle_id": "v1",
                "message": "What is the tire pressure?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }
}
