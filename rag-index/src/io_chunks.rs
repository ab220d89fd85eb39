//! Chunk-file helpers: strict reader for persisted chunk records and
//! flattening into index records.
//!
//! The reader owns its schema instead of importing the chunk-builder types:
//! the ingestion boundary is the file shape, so either side can evolve
//! behind it.

use crate::errors::RagError;
use crate::record::IndexRecord;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{fs, fs::File, io::BufReader};
use tracing::{debug, info};

/// Suffix identifying chunked output files produced by the chunk builder.
pub const CHUNKED_SUFFIX: &str = "_semantic_chunked.json";

/// Persisted chunk file shape (strict).
#[derive(Debug, Deserialize)]
pub struct ChunkFile {
    pub file_name: String,
    #[serde(default)]
    pub file_path: String,
    pub chunks: Vec<ChunkRow>,
}

/// One chunk row within a chunk file.
#[derive(Debug, Deserialize)]
pub struct ChunkRow {
    pub cluster: usize,
    pub chunk_content: String,
}

/// Lists chunk files under `dir`, sorted for deterministic ingestion order.
///
/// # Errors
/// - [`RagError::Io`] if the directory cannot be read.
pub fn list_chunk_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, RagError> {
    let mut out: Vec<PathBuf> = fs::read_dir(dir.as_ref())?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.ends_with(CHUNKED_SUFFIX))
                .unwrap_or(false)
        })
        .collect();
    out.sort();
    debug!("list_chunk_files: {} files under {:?}", out.len(), dir.as_ref());
    Ok(out)
}

/// Reads one chunk file strictly.
///
/// # Errors
/// - [`RagError::Io`] if the file cannot be opened.
/// - [`RagError::Parse`] if the shape does not match.
pub fn read_chunk_file(path: impl AsRef<Path>) -> Result<ChunkFile, RagError> {
    info!("reading chunk file {:?}", path.as_ref());
    let file = File::open(path.as_ref())?;
    let parsed: ChunkFile = serde_json::from_reader(BufReader::new(file))?;
    Ok(parsed)
}

/// Flattens a chunk file into index records, skipping blank chunks.
pub fn flatten_records(file: &ChunkFile) -> Vec<IndexRecord> {
    file.chunks
        .iter()
        .filter(|c| !c.chunk_content.trim().is_empty())
        .map(|c| IndexRecord {
            id: format!("{}#chunk-{}", file.file_name, c.cluster),
            text: c.chunk_content.clone(),
            file_name: file.file_name.clone(),
            file_path: file.file_path.clone(),
            cluster: c.cluster,
            embedding: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_skips_blank_chunks() {
        let file = ChunkFile {
            file_name: "guide.json".into(),
            file_path: "./guide.html".into(),
            chunks: vec![
                ChunkRow {
                    cluster: 0,
                    chunk_content: "Cats are small mammals.".into(),
                },
                ChunkRow {
                    cluster: 1,
                    chunk_content: "   ".into(),
                },
            ],
        };
        let records = flatten_records(&file);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "guide.json#chunk-0");
        assert_eq!(records[0].cluster, 0);
    }

    #[test]
    fn listing_filters_on_the_chunked_suffix() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a_semantic_chunked.json"), "{}").unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = list_chunk_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(
            files[0]
                .file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .ends_with(CHUNKED_SUFFIX)
        );
    }

    #[test]
    fn strict_reader_rejects_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad_semantic_chunked.json");
        fs::write(&path, r#"{"chunks": []}"#).unwrap();
        assert!(matches!(read_chunk_file(&path), Err(RagError::Parse(_))));
    }
}
