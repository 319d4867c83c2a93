//! # GearOracle Ingest
//!
//! Turns manual text into indexed vector records: overlapping word-window
//! chunks, embedded in batches, upserted with the scope metadata that
//! retrieval later filters on.

pub mod chunker;
pub mod ingestor;

pub use chunker::{chunk_text, Chunk};
pub use ingestor::{IngestError, IngestReport, Ingestor};
