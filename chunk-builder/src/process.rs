//! Per-document pipeline and directory batch driver.
//!
//! Mirrors the ingestion contract of the extraction stage: a directory of
//! `*.json` document records goes in, one `*_semantic_chunked.json` file per
//! document comes out. Each document is processed start-to-finish before the
//! next; a bad file is reported and skipped, never aborting the batch.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use llm_service::EmbeddingsProvider;

use crate::cluster::cluster_sentences;
use crate::config::ChunkBuilderConfig;
use crate::errors::ChunkError;
use crate::merge::merge_chunks;
use crate::record::{CHUNKED_SUFFIX, ChunkRecord, DocumentRecord, chunked_file_name};
use crate::segment::segment_sentences;

/// Per-item outcome counts for one batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Documents that produced a chunk record.
    pub processed: usize,
    /// Documents with no eligible sentences (not errors).
    pub skipped: usize,
    /// Documents that failed to parse or process.
    pub failed: usize,
}

/// Runs segment → cluster → merge for a single document record.
///
/// Returns `Ok(None)` when the document has no eligible sentences; that is
/// the defined skip outcome, not an error.
///
/// # Errors
/// Propagates embedding and clustering failures; see [`ChunkError`].
pub async fn process_document(
    doc: &DocumentRecord,
    provider: &dyn EmbeddingsProvider,
    cfg: &ChunkBuilderConfig,
) -> Result<Option<ChunkRecord>, ChunkError> {
    let sentences = segment_sentences(&doc.content, cfg.min_sentence_tokens);
    if sentences.is_empty() {
        info!("no meaningful content found in {}", doc.file_name);
        return Ok(None);
    }

    let labels = cluster_sentences(&sentences, provider, cfg).await?;
    let chunks = merge_chunks(&sentences, &labels);

    debug!(
        "processed {}: {} sentences -> {} chunks",
        doc.file_name,
        sentences.len(),
        chunks.len()
    );

    Ok(Some(ChunkRecord {
        file_name: doc.file_name.clone(),
        file_path: doc.file_path.clone(),
        chunks,
    }))
}

/// Processes every `*.json` document record under `input_dir` and writes
/// chunk records to `output_dir`.
///
/// Per-item outcomes are logged and counted; malformed inputs and
/// processing failures affect only their own file. Existing chunked outputs
/// in the input directory are ignored.
///
/// # Errors
/// Returns an error only for batch-level failures: invalid config, an
/// unreadable input directory, or an output directory that cannot be
/// created.
pub async fn process_dir(
    input_dir: impl AsRef<Path>,
    output_dir: impl AsRef<Path>,
    provider: &dyn EmbeddingsProvider,
    cfg: &ChunkBuilderConfig,
) -> Result<BatchSummary, ChunkError> {
    cfg.validate()?;
    fs::create_dir_all(output_dir.as_ref())?;

    let mut summary = BatchSummary::default();

    let mut entries: Vec<_> = fs::read_dir(input_dir.as_ref())?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| {
            let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
            name.ends_with(".json") && !name.ends_with(CHUNKED_SUFFIX)
        })
        .collect();
    entries.sort();

    for path in entries {
        let doc = match read_document(&path) {
            Ok(d) => d,
            Err(e) => {
                warn!("skipping malformed document {:?}: {e}", path);
                summary.failed += 1;
                continue;
            }
        };

        match process_document(&doc, provider, cfg).await {
            Ok(Some(record)) => {
                let out_path = output_dir
                    .as_ref()
                    .join(chunked_file_name(&doc.file_name));
                fs::write(&out_path, serde_json::to_string_pretty(&record)?)?;
                info!(
                    "processed {}: created {} semantic chunks",
                    doc.file_name,
                    record.chunks.len()
                );
                summary.processed += 1;
            }
            Ok(None) => {
                summary.skipped += 1;
            }
            Err(e) => {
                warn!("failed to process {}: {e}", doc.file_name);
                summary.failed += 1;
            }
        }
    }

    info!(
        "chunking batch done: processed={} skipped={} failed={}",
        summary.processed, summary.skipped, summary.failed
    );
    Ok(summary)
}

fn read_document(path: &Path) -> Result<DocumentRecord, ChunkError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::Sentence;
    use llm_service::LlmError;
    use std::{future::Future, pin::Pin};

    /// Maps animal-topic sentences and finance-topic sentences onto
    /// orthogonal axes, so expected clusters are known in advance.
    struct KeywordEmbedder;

    impl EmbeddingsProvider for KeywordEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send + 'a>> {
            let v = if text.contains("mammal") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            };
            Box::pin(async move { Ok(v) })
        }
    }

    fn cfg_with_k(k: usize) -> ChunkBuilderConfig {
        let mut cfg = ChunkBuilderConfig::new_default();
        cfg.cluster_count = k;
        cfg
    }

    #[tokio::test]
    async fn animal_and_finance_sentences_split_into_two_ordered_chunks() {
        // Four topical sentences, two per topic, interleaved by position.
        let sentences = vec![
            Sentence {
                position: 0,
                text: "Cats are mammals.".into(),
            },
            Sentence {
                position: 1,
                text: "Dogs are mammals too.".into(),
            },
            Sentence {
                position: 2,
                text: "The stock market fell today.".into(),
            },
            Sentence {
                position: 3,
                text: "Interest rates rose sharply.".into(),
            },
        ];

        let labels = cluster_sentences(&sentences, &KeywordEmbedder, &cfg_with_k(2))
            .await
            .unwrap();
        let chunks = merge_chunks(&sentences, &labels);

        assert_eq!(chunks.len(), 2);
        let animal = chunks
            .iter()
            .find(|c| c.chunk_content.contains("Cats"))
            .unwrap();
        let finance = chunks
            .iter()
            .find(|c| c.chunk_content.contains("stock"))
            .unwrap();
        assert_eq!(animal.chunk_content, "Cats are mammals. Dogs are mammals too.");
        assert_eq!(
            finance.chunk_content,
            "The stock market fell today. Interest rates rose sharply."
        );
    }

    #[tokio::test]
    async fn document_without_eligible_sentences_is_skipped() {
        let doc = DocumentRecord {
            file_name: "empty.json".into(),
            file_path: "./empty.html".into(),
            content: "Short. Tiny. No.".into(),
        };
        let out = process_document(&doc, &KeywordEmbedder, &cfg_with_k(5))
            .await
            .unwrap();
        assert!(out.is_none());
    }

    #[tokio::test]
    async fn batch_continues_past_malformed_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        fs::write(
            input.path().join("good.json"),
            serde_json::json!({
                "file_name": "good.json",
                "file_path": "./good.html",
                "content": "Cats are friendly mammals indeed. The stock market fell sharply today."
            })
            .to_string(),
        )
        .unwrap();
        fs::write(input.path().join("bad.json"), "{not valid json").unwrap();
        fs::write(
            input.path().join("empty.json"),
            serde_json::json!({
                "file_name": "empty.json",
                "file_path": "./empty.html",
                "content": "No."
            })
            .to_string(),
        )
        .unwrap();

        let summary = process_dir(
            input.path(),
            output.path(),
            &KeywordEmbedder,
            &cfg_with_k(2),
        )
        .await
        .unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                processed: 1,
                skipped: 1,
                failed: 1
            }
        );

        let written = output.path().join("good_semantic_chunked.json");
        let record: ChunkRecord =
            serde_json::from_str(&fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(record.file_name, "good.json");
        assert_eq!(record.chunks.len(), 2);
    }
}
