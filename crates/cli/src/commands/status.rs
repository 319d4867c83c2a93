//! `gearoracle status` — Show configuration and upstream health.

use gearoracle_attestation::AttestationSigner;
use gearoracle_config::AppConfig;
use gearoracle_core::provider::Provider;
use gearoracle_providers::OpenAiProvider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("GearOracle Status");
    println!("=================");
    println!("Service:          {}", config.service.name);
    println!("Gateway:          {}:{}", config.gateway.host, config.gateway.port);
    println!("Chat model:       {}", config.openai.chat_model);
    println!("Embedding model:  {}", config.openai.embedding_model);
    println!("Index:            {} (top_k {})", config.pinecone.index_name, config.pinecone.top_k);

    match AttestationSigner::from_hex_key(config.attestation.private_key.as_deref()) {
        Ok(signer) => println!("Signer address:   {}", signer.address()),
        Err(e) => println!("Signer:           NOT CONFIGURED ({e})"),
    }

    match OpenAiProvider::from_config(&config.openai) {
        Ok(provider) => match provider.health_check().await {
            Ok(true) => println!("Provider:         reachable"),
            Ok(false) => println!("Provider:         unhealthy"),
            Err(e) => println!("Provider:         unreachable ({e})"),
        },
        Err(e) => println!("Provider:         NOT CONFIGURED ({e})"),
    }

    Ok(())
}
