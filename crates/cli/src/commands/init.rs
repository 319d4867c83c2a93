//! `gearoracle init` — Write a default config file.

use gearoracle_config::AppConfig;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::path::Path::new("gearoracle.toml");
    if path.exists() {
        println!("Config already exists: {}", path.display());
        return Ok(());
    }

    std::fs::write(path, AppConfig::default_toml())?;
    println!("Created {}", path.display());
    println!();
    println!("Set the secrets via environment variables:");
    println!("  OPENAI_API_KEY, PINECONE_API_KEY, PINECONE_INDEX_HOST,");
    println!("  ATTESTATION_PRIVATE_KEY");
    Ok(())
}
