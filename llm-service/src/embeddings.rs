//! Shared embedding interface for chunk building, ingestion, and retrieval.
//!
//! Async is required because real providers perform HTTP requests. The same
//! provider instance (same model, same dimension) must embed chunks at
//! ingestion time and queries at retrieval time; the dimension check here
//! enforces the configured vector space per call.

use std::sync::Arc;
use std::{future::Future, pin::Pin};

use crate::error_handler::LlmError;
use crate::service_profiles::LlmServiceProfiles;

/// Provider interface for embedding generation.
///
/// Implement this trait to plug in your own embedding backend.
pub trait EmbeddingsProvider: Send + Sync {
    /// Async embedding function.
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send + 'a>>;
}

/// Embedding provider backed by the shared service's embedding profile.
///
/// Verifies that every returned vector has the expected dimension; a
/// mismatch is reported as [`LlmError::EmbeddingDimensionMismatch`], never
/// silently accepted.
#[derive(Clone)]
pub struct ProfileEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: usize,
}

impl ProfileEmbedder {
    /// Construct a new embedder over the shared service handle.
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: usize) -> Self {
        Self { svc, dim }
    }

    /// Expected embedding dimension.
    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl EmbeddingsProvider for ProfileEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send + 'a>> {
        Box::pin(async move {
            let resp = self.svc.embed(text).await?;

            if resp.len() != self.dim {
                return Err(LlmError::EmbeddingDimensionMismatch {
                    got: resp.len(),
                    want: self.dim,
                });
            }

            Ok(resp)
        })
    }
}

/// Provider stub for wiring paths where no embedding backend is configured.
///
/// Every call fails with [`LlmError::MissingEmbedding`].
#[derive(Clone)]
pub struct NoopEmbedder;

impl EmbeddingsProvider for NoopEmbedder {
    fn embed<'a>(
        &'a self,
        _text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send + 'a>> {
        Box::pin(async { Err(LlmError::MissingEmbedding) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_embedder_reports_missing_provider() {
        let e = NoopEmbedder;
        assert!(matches!(
            e.embed("anything").await,
            Err(LlmError::MissingEmbedding)
        ));
    }
}
