//! `gearoracle serve` — Start the HTTP chat server.

use gearoracle_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("GearOracle Chat Service");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Chat model: {}", config.openai.chat_model);
    println!("   Index: {}", config.pinecone.index_name);

    gearoracle_gateway::start(config).await?;

    Ok(())
}
