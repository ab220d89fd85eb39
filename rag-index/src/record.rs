//! Core data models used by the library.

use serde_json::Value;

/// Canonical record stored in Qdrant, one per semantic chunk.
#[derive(Clone, Debug)]
pub struct IndexRecord {
    /// Stable record identity (`<file_name>#chunk-<cluster>`).
    pub id: String,
    /// Chunk text; this is what gets embedded.
    pub text: String,
    /// Name of the source document file.
    pub file_name: String,
    /// Path of the source document.
    pub file_path: String,
    /// Cluster label the chunk was merged from.
    pub cluster: usize,
    /// Vector, filled during ingestion.
    pub embedding: Option<Vec<f32>>,
}

/// Query parameters for retrieval.
pub struct ChunkQuery<'a> {
    /// Raw query text, immutable for the duration of one request.
    pub text: &'a str,
    /// Number of nearest candidates to request.
    pub top_k: u64,
}

/// A single retrieval candidate.
///
/// `distance` is a non-negative dissimilarity score in the collection's
/// metric space; lower means more similar.
#[derive(Clone, Debug)]
pub struct RetrievedChunk {
    pub distance: f32,
    pub text: String,
    pub file_name: Option<String>,
    pub payload: Value,
}
