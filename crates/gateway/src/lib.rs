//! HTTP API gateway for GearOracle.
//!
//! Exposes the chat endpoint and a health check. Input validation happens
//! here, before any upstream call; pipeline failures surface as a single
//! generic 500 so internals never leak to clients.
//!
//! Built on Axum for high performance async HTTP.

pub mod api;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tracing::info;

use gearoracle_attestation::AttestationSigner;
use gearoracle_config::AppConfig;
use gearoracle_core::provider::Provider;
use gearoracle_core::vector::VectorStore;
use gearoracle_pipeline::{ChatPipeline, ContextRetriever, ResponseGenerator};
use gearoracle_providers::{OpenAiProvider, PineconeStore};

/// Shared application state for the gateway.
pub struct GatewayState {
    pub service_name: String,
    pub signer_address: String,
    pub pipeline: ChatPipeline,
}

pub type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(api::health_handler))
        .route("/v1/chat", post(api::chat_handler))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Assemble the pipeline from configuration.
///
/// Fails fast: a missing API key or signing key is a startup error, not
/// something to discover on the first request.
pub fn build_state(config: &AppConfig) -> Result<SharedState, Box<dyn std::error::Error>> {
    let provider: Arc<dyn Provider> = Arc::new(OpenAiProvider::from_config(&config.openai)?);
    let store: Arc<dyn VectorStore> = Arc::new(PineconeStore::from_config(&config.pinecone)?);
    let signer = Arc::new(AttestationSigner::from_hex_key(
        config.attestation.private_key.as_deref(),
    )?);
    let signer_address = signer.address().to_string();

    let pipeline = ChatPipeline::new(
        provider.clone(),
        &config.openai.embedding_model,
        ContextRetriever::new(store, config.pinecone.top_k),
        ResponseGenerator::new(
            provider,
            &config.openai.chat_model,
            config.openai.chat_temperature,
        ),
        signer,
    );

    Ok(Arc::new(GatewayState {
        service_name: config.service.name.clone(),
        signer_address,
        pipeline,
    }))
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let state = build_state(&config)?;

    info!(
        addr = %addr,
        signer = %state.signer_address,
        "Starting gateway"
    );

    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
