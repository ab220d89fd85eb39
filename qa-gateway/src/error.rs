//! Typed error for the qa-gateway crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Errors from the underlying rag-index crate.
    #[error("RAG error: {0}")]
    Rag(#[from] rag_index::RagError),

    /// Errors from the LLM service (generation or embedding).
    #[error("LLM error: {0}")]
    Llm(#[from] llm_service::LlmError),

    /// Invalid gateway configuration.
    #[error("config error: {0}")]
    Config(String),
}
