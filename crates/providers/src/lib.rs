//! Outbound client implementations for GearOracle.
//!
//! - [`openai::OpenAiProvider`] — embeddings and chat completions against
//!   any OpenAI-compatible endpoint.
//! - [`pinecone::PineconeStore`] — filtered nearest-neighbor queries and
//!   batch upserts against a Pinecone-style vector index.
//!
//! Both clients are stateless from the service's perspective and safe to
//! share across concurrent requests behind an `Arc`.

pub mod openai;
pub mod pinecone;

pub use openai::OpenAiProvider;
pub use pinecone::PineconeStore;
