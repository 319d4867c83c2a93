//! `gearoracle ingest` — Chunk and index a manual for one user/vehicle.

use std::path::Path;
use std::sync::Arc;

use gearoracle_config::AppConfig;
use gearoracle_core::provider::Provider;
use gearoracle_core::vector::VectorStore;
use gearoracle_ingest::Ingestor;
use gearoracle_providers::{OpenAiProvider, PineconeStore};

pub async fn run(
    file: &Path,
    user_id: &str,
    vehicle_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let text = std::fs::read_to_string(file)
        .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
    let source_file = file
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or("File path has no usable file name")?;

    let provider: Arc<dyn Provider> = Arc::new(OpenAiProvider::from_config(&config.openai)?);
    let store: Arc<dyn VectorStore> = Arc::new(PineconeStore::from_config(&config.pinecone)?);

    let ingestor = Ingestor::new(
        provider,
        store,
        &config.openai.embedding_model,
        config.ingest.chunk_size,
        config.ingest.chunk_overlap,
        config.ingest.batch_size,
    );

    println!("Indexing {} for user={user_id} vehicle={vehicle_id}", source_file);

    let report = ingestor.ingest(user_id, vehicle_id, source_file, &text).await?;

    println!(
        "Indexed {} chunks in {} batches from {}",
        report.chunks, report.batches, report.source_file
    );
    Ok(())
}
