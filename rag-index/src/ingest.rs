//! Ingestion pipeline: read chunk files → embed → upsert into Qdrant.
//!
//! The write path is a separate phase from query-time retrieval; ingestion
//! and search are never interleaved within one process run.

use crate::config::{RagConfig, VectorSpace};
use crate::embed_pool::embed_missing;
use crate::errors::RagError;
use crate::io_chunks::{flatten_records, list_chunk_files, read_chunk_file};
use crate::qdrant_facade::QdrantFacade;
use crate::record::IndexRecord;

use indicatif::{ProgressBar, ProgressStyle};
use llm_service::EmbeddingsProvider;
use qdrant_client::qdrant::{PointId, PointStruct, Value as QValue, Vector, Vectors, value, vectors};
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Ingests every chunk file under `dir` into the configured collection.
///
/// Chunk vectors are computed on the fly via `provider` with the configured
/// concurrency. A chunk file that fails to parse is reported and skipped;
/// the batch continues with the remaining files.
///
/// Returns the number of points upserted.
///
/// # Errors
/// Returns errors on unreadable directories, vector size mismatch, or
/// Qdrant failures.
pub async fn ingest_dir(
    cfg: &RagConfig,
    dir: impl AsRef<std::path::Path>,
    provider: &dyn EmbeddingsProvider,
    client: &QdrantFacade,
) -> Result<u64, RagError> {
    info!("Ingesting chunk files from {:?}", dir.as_ref());

    let mut records: Vec<IndexRecord> = Vec::new();
    let mut bad_files = 0usize;
    for path in list_chunk_files(&dir)? {
        match read_chunk_file(&path) {
            Ok(file) => records.extend(flatten_records(&file)),
            Err(e) => {
                warn!("skipping malformed chunk file {:?}: {e}", path);
                bad_files += 1;
            }
        }
    }

    if records.is_empty() {
        warn!("No chunk records collected (skipped {bad_files} bad files)");
        return Ok(0);
    }

    let conc = cfg.embedding_concurrency.unwrap_or(4);
    embed_missing(&mut records, provider, cfg.embedding_dim, conc).await?;

    let vector_size = determine_vector_size(&records, cfg.embedding_dim)?;
    client
        .ensure_collection(&VectorSpace {
            size: vector_size,
            distance: cfg.distance,
        })
        .await?;

    // Progress bar for batch uploads
    let batch_size = cfg.upsert_batch.max(1);
    let total_batches = records.len().div_ceil(batch_size);
    let pb = ProgressBar::new(total_batches as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap()
        .progress_chars("##-"),
    );

    let mut total: u64 = 0;
    for chunk in records.chunks(batch_size) {
        let points = build_points(chunk, vector_size)?;
        total += client.upsert_points(points).await?;
        pb.inc(1);
    }

    pb.finish_with_message("ingestion complete");
    info!("Ingested {} chunk records total", total);

    Ok(total)
}

// ---------- helpers ----------

/// Determines the embedding dimensionality from config or the first vector.
fn determine_vector_size(
    records: &[IndexRecord],
    expected_dim: Option<usize>,
) -> Result<usize, RagError> {
    if let Some(dim) = expected_dim {
        if let Some(v) = records.iter().find_map(|r| r.embedding.as_ref()) {
            if v.len() != dim {
                return Err(RagError::VectorSizeMismatch {
                    got: v.len(),
                    want: dim,
                });
            }
        }
        return Ok(dim);
    }

    records
        .iter()
        .find_map(|r| r.embedding.as_ref())
        .map(|v| v.len())
        .ok_or_else(|| RagError::Config("no embeddings resolved for any record".into()))
}

/// Builds Qdrant points for a batch of records with a compact payload.
fn build_points(chunk: &[IndexRecord], vector_size: usize) -> Result<Vec<PointStruct>, RagError> {
    let mut pts = Vec::with_capacity(chunk.len());

    for r in chunk {
        let vector = match &r.embedding {
            Some(v) => v.clone(),
            None => return Err(RagError::Config(format!("record {} has no vector", r.id))),
        };
        if vector.len() != vector_size {
            return Err(RagError::VectorSizeMismatch {
                got: vector.len(),
                want: vector_size,
            });
        }

        let mut payload: HashMap<String, QValue> = HashMap::new();
        payload.insert("text".into(), qstring(&r.text));
        payload.insert("file_name".into(), qstring(&r.file_name));
        if !r.file_path.is_empty() {
            payload.insert("file_path".into(), qstring(&r.file_path));
        }
        payload.insert(
            "cluster".into(),
            QValue {
                kind: Some(value::Kind::IntegerValue(r.cluster as i64)),
            },
        );

        let pid: PointId = stable_point_id(&r.id).to_string().into();

        let vectors = Vectors {
            vectors_options: Some(vectors::VectorsOptions::Vector(Vector {
                data: vector,
                indices: None,
                vectors_count: None,
                vector: None,
            })),
        };

        pts.push(PointStruct {
            id: Some(pid),
            payload,
            vectors: Some(vectors),
            ..Default::default()
        });
    }

    Ok(pts)
}

/// Deterministic UUIDv5 from an arbitrary string id, so re-ingesting the
/// same chunk updates its point instead of duplicating it.
fn stable_point_id(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}

/// Wraps a string into Qdrant `Value`.
fn qstring(s: &str) -> QValue {
    QValue {
        kind: Some(value::Kind::StringValue(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Option<Vec<f32>>) -> IndexRecord {
        IndexRecord {
            id: id.into(),
            text: "Cats are small mammals.".into(),
            file_name: "guide.json".into(),
            file_path: "./guide.html".into(),
            cluster: 0,
            embedding,
        }
    }

    #[test]
    fn stable_point_id_is_deterministic() {
        let a = stable_point_id("guide.json#chunk-0");
        let b = stable_point_id("guide.json#chunk-0");
        let c = stable_point_id("guide.json#chunk-1");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn vector_size_comes_from_config_when_set() {
        let records = vec![record("a", Some(vec![0.0; 4]))];
        assert_eq!(determine_vector_size(&records, Some(4)).unwrap(), 4);
        assert!(matches!(
            determine_vector_size(&records, Some(8)),
            Err(RagError::VectorSizeMismatch { got: 4, want: 8 })
        ));
    }

    #[test]
    fn vector_size_falls_back_to_first_embedding() {
        let records = vec![record("a", None), record("b", Some(vec![0.0; 6]))];
        assert_eq!(determine_vector_size(&records, None).unwrap(), 6);
    }

    #[test]
    fn build_points_rejects_mismatched_vectors() {
        let records = vec![record("a", Some(vec![0.0; 3]))];
        assert!(matches!(
            build_points(&records, 4),
            Err(RagError::VectorSizeMismatch { got: 3, want: 4 })
        ));
    }

    #[test]
    fn build_points_carries_chunk_payload() {
        let records = vec![record("a", Some(vec![0.0; 4]))];
        let pts = build_points(&records, 4).unwrap();
        assert_eq!(pts.len(), 1);
        assert!(pts[0].payload.contains_key("text"));
        assert!(pts[0].payload.contains_key("file_name"));
        assert!(pts[0].payload.contains_key("cluster"));
    }
}
