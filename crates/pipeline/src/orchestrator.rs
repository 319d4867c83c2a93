//! Request orchestration.
//!
//! State machine per chat turn: `EMBED → RETRIEVE → GENERATE → ATTEST`,
//! strictly sequential. The only branch is the "no context found" case,
//! which logs and continues into generation with empty context. Each stage
//! failure is typed with its stage so the boundary can log precisely while
//! surfacing a single generic error to callers.

use std::sync::Arc;

use gearoracle_attestation::{AttestationSigner, KnowledgeAttestation};
use gearoracle_core::error::{AttestationError, ProviderError, VectorStoreError};
use gearoracle_core::provider::{EmbeddingRequest, Provider};
use gearoracle_core::source::ContextSource;
use gearoracle_core::vector::MetadataFilter;
use thiserror::Error;
use tracing::info;

use crate::generator::ResponseGenerator;
use crate::retriever::ContextRetriever;

/// A failure in one pipeline stage, tagged with where it happened.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("embedding stage failed: {0}")]
    Embedding(#[source] ProviderError),

    #[error("retrieval stage failed: {0}")]
    Retrieval(#[source] VectorStoreError),

    #[error("generation stage failed: {0}")]
    Generation(#[source] ProviderError),

    #[error("attestation stage failed: {0}")]
    Attestation(#[source] AttestationError),
}

impl PipelineError {
    /// The stage name, for structured logging.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Embedding(_) => "embed",
            PipelineError::Retrieval(_) => "retrieve",
            PipelineError::Generation(_) => "generate",
            PipelineError::Attestation(_) => "attest",
        }
    }

    /// Whether the failure is a transient upstream condition rather than a
    /// configuration fault. No automatic retry is performed either way;
    /// the distinction exists for logging and operator triage.
    pub fn is_transient(&self) -> bool {
        match self {
            PipelineError::Embedding(e) | PipelineError::Generation(e) => e.is_transient(),
            PipelineError::Retrieval(e) => matches!(e, VectorStoreError::Network(_)),
            PipelineError::Attestation(_) => false,
        }
    }
}

/// One chat turn's validated input.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub user_id: String,
    pub vehicle_id: String,
    pub message: String,
}

/// The assembled result of a chat turn.
#[derive(Debug)]
pub struct ChatOutcome {
    pub response_text: String,
    pub sources: Vec<ContextSource>,
    pub attestation: KnowledgeAttestation,
}

/// Sequences retriever → generator → attestation builder for each request.
pub struct ChatPipeline {
    provider: Arc<dyn Provider>,
    embedding_model: String,
    retriever: ContextRetriever,
    generator: ResponseGenerator,
    signer: Arc<AttestationSigner>,
}

impl ChatPipeline {
    pub fn new(
        provider: Arc<dyn Provider>,
        embedding_model: impl Into<String>,
        retriever: ContextRetriever,
        generator: ResponseGenerator,
        signer: Arc<AttestationSigner>,
    ) -> Self {
        Self {
            provider,
            embedding_model: embedding_model.into(),
            retriever,
            generator,
            signer,
        }
    }

    /// Run the full pipeline for one chat turn.
    pub async fn handle(&self, turn: &ChatTurn) -> Result<ChatOutcome, PipelineError> {
        // EMBED
        let embedding = self.embed_query(&turn.message).await?;

        // RETRIEVE — empty context is tolerated, not an error
        let filter = MetadataFilter {
            user_id: turn.user_id.clone(),
            vehicle_id: turn.vehicle_id.clone(),
        };
        let sources = self
            .retriever
            .retrieve(&embedding, &filter)
            .await
            .map_err(PipelineError::Retrieval)?;

        // GENERATE
        let response_text = self
            .generator
            .generate(&turn.message, &sources)
            .await
            .map_err(PipelineError::Generation)?;

        // ATTEST — signing failure is fatal to the request
        let attestation = self
            .signer
            .attest(&turn.message, &response_text, &sources)
            .map_err(PipelineError::Attestation)?;

        info!(
            sources = sources.len(),
            hashes = attestation.context_hashes.len(),
            "chat turn completed"
        );

        Ok(ChatOutcome {
            response_text,
            sources,
            attestation,
        })
    }

    async fn embed_query(&self, message: &str) -> Result<Vec<f32>, PipelineError> {
        let request = EmbeddingRequest {
            model: self.embedding_model.clone(),
            inputs: vec![message.to_string()],
        };

        let mut response = self
            .provider
            .embed(request)
            .await
            .map_err(PipelineError::Embedding)?;

        if response.embeddings.is_empty() {
            return Err(PipelineError::Embedding(ProviderError::EmptyResponse));
        }
        Ok(response.embeddings.swap_remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gearoracle_core::provider::{ChatRequest, ChatResponse, EmbeddingResponse};
    use gearoracle_core::source::ScoredMatch;
    use gearoracle_core::vector::{UpsertRecord, VectorStore};

    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    struct MockProvider {
        answer: String,
        fail_embedding: bool,
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn embed(
            &self,
            request: EmbeddingRequest,
        ) -> Result<EmbeddingResponse, ProviderError> {
            if self.fail_embedding {
                return Err(ProviderError::Network("connection refused".into()));
            }
            Ok(EmbeddingResponse {
                embeddings: vec![vec![0.1; 8]; request.inputs.len()],
                model: request.model,
                usage: None,
            })
        }

        async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
            Ok(ChatResponse {
                content: self.answer.clone(),
                model: request.model,
                usage: None,
            })
        }
    }

    struct MockStore {
        texts: Vec<&'static str>,
    }

    #[async_trait::async_trait]
    impl VectorStore for MockStore {
        fn name(&self) -> &str {
            "mock"
        }

        async fn query(
            &self,
            _vector: &[f32],
            _top_k: usize,
            _filter: &MetadataFilter,
        ) -> Result<Vec<ScoredMatch>, VectorStoreError> {
            Ok(self
                .texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    let mut metadata = serde_json::Map::new();
                    metadata.insert("text".into(), serde_json::json!(text));
                    metadata.insert("source_file".into(), serde_json::json!("accord.pdf"));
                    ScoredMatch {
                        id: format!("accord.pdf-{i}"),
                        score: 0.9 - i as f32 * 0.1,
                        metadata,
                    }
                })
                .collect())
        }

        async fn upsert(&self, _records: Vec<UpsertRecord>) -> Result<(), VectorStoreError> {
            Ok(())
        }
    }

    fn pipeline(provider: MockProvider, store: MockStore) -> ChatPipeline {
        let provider: Arc<dyn Provider> = Arc::new(provider);
        let store: Arc<dyn VectorStore> = Arc::new(store);
        let signer = Arc::new(AttestationSigner::from_hex_key(Some(TEST_KEY)).unwrap());
        ChatPipeline::new(
            provider.clone(),
            "text-embedding-3-small",
            ContextRetriever::new(store, 5),
            ResponseGenerator::new(provider, "gpt-4o-mini", 0.2),
            signer,
        )
    }

    fn turn(message: &str) -> ChatTurn {
        ChatTurn {
            user_id: "u1".into(),
            vehicle_id: "v1".into(),
            message: message.into(),
        }
    }

    #[tokio::test]
    async fn end_to_end_chat_turn() {
        let p = pipeline(
            MockProvider {
                answer: "32 psi front and rear (accord.pdf).".into(),
                fail_embedding: false,
            },
            MockStore {
                texts: vec![
                    "Tire pressure: 32 psi front, 32 psi rear",
                    "Check tire pressure monthly when cold",
                ],
            },
        );

        let outcome = p.handle(&turn("What is the tire pressure?")).await.unwrap();

        assert_eq!(outcome.sources.len(), 2);
        assert_eq!(outcome.attestation.context_hashes.len(), 2);
        assert!(outcome.attestation.context_hashes[0] <= outcome.attestation.context_hashes[1]);
        assert!(outcome.attestation.timestamp.ends_with("+00:00"));
        outcome.attestation.verify().unwrap();
        assert_eq!(outcome.attestation.query, "What is the tire pressure?");
        assert_eq!(outcome.attestation.response, outcome.response_text);
    }

    #[tokio::test]
    async fn empty_context_still_attests() {
        let p = pipeline(
            MockProvider {
                answer: "That information is not available in my current knowledge base.".into(),
                fail_embedding: false,
            },
            MockStore { texts: vec![] },
        );

        let outcome = p.handle(&turn("What is the towing capacity?")).await.unwrap();
        assert!(outcome.sources.is_empty());
        assert!(outcome.attestation.context_hashes.is_empty());
        outcome.attestation.verify().unwrap();
    }

    #[tokio::test]
    async fn embedding_failure_is_tagged() {
        let p = pipeline(
            MockProvider {
                answer: String::new(),
                fail_embedding: true,
            },
            MockStore { texts: vec![] },
        );

        let err = p.handle(&turn("q")).await.unwrap_err();
        assert_eq!(err.stage(), "embed");
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn duplicate_sources_keep_duplicate_hashes() {
        let p = pipeline(
            MockProvider {
                answer: "answer".into(),
                fail_embedding: false,
            },
            MockStore {
                texts: vec!["same excerpt", "same excerpt"],
            },
        );

        let outcome = p.handle(&turn("q")).await.unwrap();
        assert_eq!(outcome.attestation.context_hashes.len(), 2);
        assert_eq!(
            outcome.attestation.context_hashes[0],
            outcome.attestation.context_hashes[1]
        );
    }
}
