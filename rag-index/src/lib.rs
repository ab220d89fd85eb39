//! High-level RAG index facade: ingestion + retrieval over Qdrant.
//!
//! This crate provides a clean API to:
//! - Ingest semantic chunk files with on-the-fly embeddings
//! - Retrieve distance-ordered context candidates for a textual query
//!
//! The design is flat (no deep nesting) and splits responsibilities into
//! focused modules.

mod config;
mod embed_pool;
mod errors;
mod ingest;
mod io_chunks;
mod qdrant_facade;
mod record;
mod retrieve;

pub use config::{DistanceKind, RagConfig, VectorSpace};
pub use errors::RagError;
pub use record::{ChunkQuery, IndexRecord, RetrievedChunk};
pub use retrieve::score_to_distance;

use llm_service::EmbeddingsProvider;
use tracing::{debug, trace};

/// High-level facade that wires configuration and the Qdrant client.
///
/// This is the single entry point recommended for application code. The
/// index is long-lived, externally owned state; construct one facade per
/// process and share it read-only across retrieval units.
pub struct RagIndex {
    cfg: RagConfig,
    client: qdrant_facade::QdrantFacade,
}

impl RagIndex {
    /// Constructs a new index facade from the given configuration.
    ///
    /// # Errors
    /// Returns `RagError::Config` if validation or client initialization
    /// fails.
    pub fn new(cfg: RagConfig) -> Result<Self, RagError> {
        trace!("RagIndex::new collection={}", cfg.collection);
        let client = qdrant_facade::QdrantFacade::new(&cfg)?;
        Ok(Self { cfg, client })
    }

    /// Ingests every chunk file under `dir` into the collection.
    ///
    /// # Errors
    /// Returns errors on I/O, vector size mismatch, or Qdrant failures;
    /// individual malformed chunk files are skipped, not fatal.
    pub async fn ingest_dir(
        &self,
        dir: impl AsRef<std::path::Path>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<u64, RagError> {
        debug!("RagIndex::ingest_dir dir={:?}", dir.as_ref());
        ingest::ingest_dir(&self.cfg, dir, provider, &self.client).await
    }

    /// Performs a low-level vector search and returns `(score, payload)` tuples.
    ///
    /// # Errors
    /// Returns `RagError::Qdrant` if the search fails.
    pub async fn search_by_vector(
        &self,
        query_vector: Vec<f32>,
        top_k: u64,
        with_payload: bool,
    ) -> Result<Vec<(f32, serde_json::Value)>, RagError> {
        trace!("RagIndex::search_by_vector top_k={top_k} with_payload={with_payload}");
        retrieve::search_by_vector(&self.cfg, &self.client, query_vector, top_k, with_payload).await
    }

    /// Retrieves distance-ordered context candidates for a textual query.
    ///
    /// # Errors
    /// Returns embedding errors or Qdrant failures.
    pub async fn chunk_context(
        &self,
        query: ChunkQuery<'_>,
        provider: &dyn EmbeddingsProvider,
    ) -> Result<Vec<RetrievedChunk>, RagError> {
        trace!("RagIndex::chunk_context top_k={}", query.top_k);
        retrieve::chunk_context(&self.cfg, &self.client, query, provider).await
    }
}
