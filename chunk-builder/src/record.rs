//! Persisted data models for chunk building.

use serde::{Deserialize, Serialize};

/// Extracted document record produced by the acquisition collaborator.
///
/// Chunking consumes only `content`; the name and path travel through to
/// the persisted chunk record for provenance.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub file_name: String,
    #[serde(default)]
    pub file_path: String,
    pub content: String,
}

/// A merged, topically coherent passage of original-order sentences.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub cluster: usize,
    pub chunk_content: String,
}

/// Persisted per-document chunk file shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub file_name: String,
    pub file_path: String,
    pub chunks: Vec<Chunk>,
}

/// Suffix appended to chunked output files; the ingestion side filters on it.
pub const CHUNKED_SUFFIX: &str = "_semantic_chunked.json";

/// Derives the output file name for a processed document record.
///
/// `guide.json` becomes `guide_semantic_chunked.json`; names without a
/// `.json` extension get the suffix appended.
pub fn chunked_file_name(input_name: &str) -> String {
    match input_name.strip_suffix(".json") {
        Some(stem) => format!("{stem}{CHUNKED_SUFFIX}"),
        None => format!("{input_name}{CHUNKED_SUFFIX}"),
    }
}
