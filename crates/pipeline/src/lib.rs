//! # GearOracle Pipeline
//!
//! The request pipeline: `EMBED → RETRIEVE → GENERATE → ATTEST`, strictly
//! sequential. Each stage has its own component and typed error; the
//! orchestrator aggregates them so the boundary layer can surface a single
//! generic failure while stages stay independently testable.

pub mod generator;
pub mod orchestrator;
pub mod retriever;

pub use generator::ResponseGenerator;
pub use orchestrator::{ChatOutcome, ChatPipeline, ChatTurn, PipelineError};
pub use retriever::ContextRetriever;
