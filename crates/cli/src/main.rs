//! GearOracle CLI — the main entry point.
//!
//! Commands:
//! - `init`    — Write a default config file
//! - `serve`   — Start the HTTP chat server
//! - `ingest`  — Chunk and index a manual for one user/vehicle
//! - `verify`  — Verify a saved knowledge attestation
//! - `status`  — Show configuration and upstream health

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "gearoracle",
    about = "GearOracle — attested automotive RAG chat service",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file (gearoracle.toml)
    Init,

    /// Start the HTTP chat server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Chunk and index a manual text file
    Ingest {
        /// Path to the manual text file
        file: PathBuf,

        /// Owner of the manual
        #[arg(long)]
        user_id: String,

        /// Vehicle the manual belongs to
        #[arg(long)]
        vehicle_id: String,
    },

    /// Verify a saved knowledge attestation JSON file
    Verify {
        /// Path to the attestation JSON
        file: PathBuf,

        /// Expected signer address (defaults to the one embedded in the file)
        #[arg(long)]
        address: Option<String>,
    },

    /// Show configuration and upstream health
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run()?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Ingest {
            file,
            user_id,
            vehicle_id,
        } => commands::ingest::run(&file, &user_id, &vehicle_id).await?,
        Commands::Verify { file, address } => commands::verify::run(&file, address.as_deref())?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
