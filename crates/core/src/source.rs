//! Context source domain types.
//!
//! A `ContextSource` is one retrieved excerpt that grounds a generated
//! answer. Sources are produced by the retriever, immutable afterward, and
//! consumed by both the response generator and the attestation builder.

use serde::{Deserialize, Serialize};

/// A single source of information used to generate an AI response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSource {
    /// Type of the source, e.g. "manual", "api", "on-chain".
    pub source_type: String,

    /// Name of the source, e.g. "2021_honda_accord_manual.pdf".
    pub source_name: String,

    /// The actual text content from the source.
    pub content: String,

    /// Additional metadata, e.g. page number, similarity score.
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ContextSource {
    /// Create a manual-excerpt source with the given name and content.
    pub fn manual(source_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source_type: "manual".into(),
            source_name: source_name.into(),
            content: content.into(),
            metadata: serde_json::Map::new(),
        }
    }

    /// Attach a metadata entry, builder-style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// The page number from metadata, if recorded.
    pub fn page(&self) -> Option<u64> {
        self.metadata.get("page").and_then(|v| v.as_u64())
    }
}

/// A raw similarity match returned by a vector store, before conversion
/// into a `ContextSource`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    /// The vector record id.
    pub id: String,

    /// Similarity score (higher = closer).
    pub score: f32,

    /// Metadata carried on the record (source text, file, page, scope ids).
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl ScoredMatch {
    /// Convert a store match into a `ContextSource`, pulling the excerpt
    /// text and provenance out of the record metadata. Records without a
    /// `text` field yield an empty-content source rather than an error.
    pub fn into_context_source(self) -> ContextSource {
        let source_name = self
            .metadata
            .get("source_file")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown Manual")
            .to_string();
        let content = self
            .metadata
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut metadata = serde_json::Map::new();
        if let Some(page) = self.metadata.get("page_number") {
            metadata.insert("page".into(), page.clone());
        }
        metadata.insert("score".into(), serde_json::json!(self.score));

        ContextSource {
            source_type: "manual".into(),
            source_name,
            content,
            metadata,
        }
    }
}
