//! Response generation.
//!
//! Builds a fixed system/user prompt pair from the retrieved context and
//! asks the chat provider for a single low-temperature completion. The
//! citation requirement is a prompting-level contract: the model is told
//! to cite source names and page numbers, but cited names are not
//! validated against the retrieved set afterward.

use std::sync::Arc;

use gearoracle_core::error::ProviderError;
use gearoracle_core::provider::{ChatRequest, Provider};
use gearoracle_core::source::ContextSource;
use tracing::{debug, info};

/// System prompt fixing the assistant's persona and grounding rules.
const SYSTEM_PROMPT: &str = "\
You are GearOracle, an expert automotive assistant. Your knowledge is absolute but confined to the context provided.
Answer the user's query clearly and concisely.
You MUST cite your sources by referencing the source name and any available metadata (like page numbers).
If the context does not contain the answer, you MUST state that the information is not available in your current knowledge base.
Do not invent information.";

/// Fallback answer when the provider returns empty content.
const EMPTY_COMPLETION_FALLBACK: &str = "I am unable to provide a response at this time.";

/// Generates grounded answers from retrieved context.
pub struct ResponseGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }

    /// Build the user prompt embedding every source with its name and page
    /// metadata, followed by the query.
    pub fn build_user_prompt(query: &str, context: &[ContextSource]) -> String {
        let context_str = context
            .iter()
            .map(|src| {
                let page = src
                    .page()
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "unknown".into());
                format!(
                    "Source: {}, Page: {}\nContent: {}",
                    src.source_name, page, src.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        format!("CONTEXT:\n{context_str}\n\nQUERY:\n{query}")
    }

    /// Produce the final answer for a query given its retrieved context.
    pub async fn generate(
        &self,
        query: &str,
        context: &[ContextSource],
    ) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: self.model.clone(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt: Self::build_user_prompt(query, context),
            temperature: self.temperature,
            max_tokens: None,
        };

        debug!(model = %self.model, sources = context.len(), "Generating response");

        let response = self.provider.complete(request).await?;

        let answer = if response.content.trim().is_empty() {
            EMPTY_COMPLETION_FALLBACK.to_string()
        } else {
            response.content
        };

        info!(
            sources = context.len(),
            answer_len = answer.len(),
            "Response generated"
        );

        Ok(answer)
    }
}
