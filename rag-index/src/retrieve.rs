//! Retrieval helpers: vector search and distance-ordered chunk context.

use crate::config::{DistanceKind, RagConfig};
use crate::errors::RagError;
use crate::qdrant_facade::QdrantFacade;
use crate::record::{ChunkQuery, RetrievedChunk};

use llm_service::EmbeddingsProvider;
use tracing::trace;

/// Performs a low-level similarity search given a ready query vector.
///
/// # Errors
/// Returns `RagError::Qdrant` on client failures.
pub async fn search_by_vector(
    cfg: &RagConfig,
    client: &QdrantFacade,
    query_vector: Vec<f32>,
    top_k: u64,
    with_payload: bool,
) -> Result<Vec<(f32, serde_json::Value)>, RagError> {
    trace!("retrieve::search_by_vector top_k={top_k} with_payload={with_payload}");
    let res = client
        .search(query_vector, top_k, with_payload, cfg.exact_search)
        .await?;
    Ok(res)
}

/// Embeds the query text and returns candidates ordered by ascending
/// distance (best match first).
///
/// The query must be embedded by the same provider that embedded the
/// chunks; mismatched vector spaces make retrieval meaningless. An empty
/// index yields an empty result, not an error.
///
/// # Errors
/// Returns embedding/provider errors or Qdrant failures.
pub async fn chunk_context(
    cfg: &RagConfig,
    client: &QdrantFacade,
    query: ChunkQuery<'_>,
    provider: &dyn EmbeddingsProvider,
) -> Result<Vec<RetrievedChunk>, RagError> {
    trace!("retrieve::chunk_context top_k={}", query.top_k);

    let qv = provider.embed(query.text).await?;
    let hits = search_by_vector(cfg, client, qv, query.top_k, true).await?;

    let mut out: Vec<RetrievedChunk> = hits
        .into_iter()
        .map(|(score, payload)| payload_to_chunk(score_to_distance(cfg.distance, score), payload))
        .collect();

    // Normalize ordering: ascending distance regardless of engine quirks.
    out.sort_by(|a, b| a.distance.total_cmp(&b.distance));

    trace!("retrieve::chunk_context hits={}", out.len());
    Ok(out)
}

/// Converts the engine's raw score into a dissimilarity in the collection's
/// metric space (lower = more similar).
///
/// - Euclid: the score already is the distance.
/// - Cosine: the engine reports similarity in `[-1, 1]`; `1 - s` maps it to
///   a distance in `[0, 2]`.
/// - Dot: higher is better; negation restores lower-is-better ordering.
pub fn score_to_distance(kind: DistanceKind, score: f32) -> f32 {
    match kind {
        DistanceKind::Euclid => score,
        DistanceKind::Cosine => 1.0 - score,
        DistanceKind::Dot => -score,
    }
}

fn payload_to_chunk(distance: f32, payload: serde_json::Value) -> RetrievedChunk {
    let text = payload
        .get("text")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let file_name = payload
        .get("file_name")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    RetrievedChunk {
        distance,
        text,
        file_name,
        payload,
    }
}
