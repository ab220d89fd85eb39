//! Embedding executor with concurrency and dimension checks.

use crate::{errors::RagError, record::IndexRecord};
use futures::stream::{self, StreamExt};
use llm_service::EmbeddingsProvider;
use tracing::{debug, info};

/// Embeds texts for records that have no precomputed vectors.
///
/// # Arguments
/// - `records`: mutable slice of [`IndexRecord`]s.
/// - `provider`: embedding backend.
/// - `expected_dim`: if `Some`, enforces this vector size (error on mismatch).
/// - `concurrency`: maximum number of concurrent embedding tasks.
///
/// # Errors
/// Returns [`RagError::VectorSizeMismatch`] if dimensions mismatch,
/// or [`RagError::Llm`] if the provider fails.
pub async fn embed_missing(
    records: &mut [IndexRecord],
    provider: &dyn EmbeddingsProvider,
    expected_dim: Option<usize>,
    concurrency: usize,
) -> Result<(), RagError> {
    info!(
        "embed_pool::embed_missing: total={} concurrency={}",
        records.len(),
        concurrency
    );

    let idxs: Vec<usize> = records
        .iter()
        .enumerate()
        .filter_map(|(i, r)| if r.embedding.is_none() { Some(i) } else { None })
        .collect();

    if idxs.is_empty() {
        debug!("embed_pool::embed_missing: nothing to embed");
        return Ok(());
    }

    let results: Vec<(usize, Vec<f32>)> = stream::iter(idxs.into_iter())
        .map(|i| {
            let text = records[i].text.clone();
            async move {
                let v = provider.embed(&text).await?;
                Ok::<(usize, Vec<f32>), RagError>((i, v))
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, RagError>>()?;

    for (i, v) in results {
        if let Some(want) = expected_dim {
            if v.len() != want {
                return Err(RagError::VectorSizeMismatch { got: v.len(), want });
            }
        }
        records[i].embedding = Some(v);
    }

    debug!("embed_pool::embed_missing: embeddings filled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_service::LlmError;
    use std::{future::Future, pin::Pin};

    struct FixedEmbedder(usize);

    impl EmbeddingsProvider for FixedEmbedder {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send + 'a>> {
            let dim = self.0;
            Box::pin(async move { Ok(vec![0.5; dim]) })
        }
    }

    fn record(id: &str) -> IndexRecord {
        IndexRecord {
            id: id.into(),
            text: "Cats are small mammals.".into(),
            file_name: "guide.json".into(),
            file_path: "./guide.html".into(),
            cluster: 0,
            embedding: None,
        }
    }

    #[tokio::test]
    async fn fills_missing_vectors_in_place() {
        let mut records = vec![record("a"), record("b")];
        embed_missing(&mut records, &FixedEmbedder(4), Some(4), 2)
            .await
            .unwrap();
        assert!(records.iter().all(|r| r.embedding.as_ref().unwrap().len() == 4));
    }

    #[tokio::test]
    async fn enforces_expected_dimension() {
        let mut records = vec![record("a")];
        let err = embed_missing(&mut records, &FixedEmbedder(3), Some(4), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RagError::VectorSizeMismatch { got: 3, want: 4 }
        ));
    }
}
