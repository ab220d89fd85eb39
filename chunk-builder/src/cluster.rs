//! Sentence clustering: embedding + seeded multi-restart k-means.
//!
//! Clustering groups sentences by latent topic rather than physical
//! adjacency, which produces passages more coherent than fixed-length
//! windowing. A fixed seed plus multiple restarts trades a little clustering
//! quality for reproducibility: identical input and config always yield
//! identical labels.

use futures::stream::{self, StreamExt};
use tracing::{debug, trace};

use llm_service::EmbeddingsProvider;

use crate::config::ChunkBuilderConfig;
use crate::errors::ChunkError;
use crate::segment::Sentence;

/// Embeds every sentence and assigns each one a cluster label.
///
/// The effective cluster count is `min(cfg.cluster_count, sentences.len())`;
/// zero sentences produce zero labels. Labels in the result are contiguous
/// non-negative integers (`0..m`, `m <= k_eff`), one per input sentence, in
/// input order.
///
/// # Errors
/// - [`ChunkError::Embedding`] if the provider fails.
/// - [`ChunkError::VectorSizeMismatch`] if sentence embeddings disagree on
///   dimension (a precondition violation, reported rather than coerced).
pub async fn cluster_sentences(
    sentences: &[Sentence],
    provider: &dyn EmbeddingsProvider,
    cfg: &ChunkBuilderConfig,
) -> Result<Vec<usize>, ChunkError> {
    let k_eff = cfg.cluster_count.min(sentences.len());
    if k_eff < 1 {
        return Ok(Vec::new());
    }

    let vectors = embed_sentences(sentences, provider, cfg.embed_concurrency).await?;

    let labels = kmeans_best(
        &vectors,
        k_eff,
        cfg.kmeans_seed,
        cfg.kmeans_restarts,
        cfg.kmeans_max_iters,
    );

    debug!(
        "cluster_sentences: {} sentences -> {} clusters",
        sentences.len(),
        labels.iter().copied().max().map(|m| m + 1).unwrap_or(0)
    );
    Ok(labels)
}

/// Embeds all sentences with bounded concurrency, preserving input order.
async fn embed_sentences(
    sentences: &[Sentence],
    provider: &dyn EmbeddingsProvider,
    concurrency: usize,
) -> Result<Vec<Vec<f32>>, ChunkError> {
    let results: Vec<(usize, Vec<f32>)> = stream::iter(sentences.iter().enumerate())
        .map(|(i, s)| {
            let text = s.text.clone();
            async move {
                let v = provider.embed(&text).await?;
                Ok::<(usize, Vec<f32>), ChunkError>((i, v))
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, ChunkError>>()?;

    let mut vectors: Vec<Vec<f32>> = vec![Vec::new(); sentences.len()];
    for (i, v) in results {
        vectors[i] = v;
    }

    let want = vectors[0].len();
    for v in &vectors {
        if v.len() != want {
            return Err(ChunkError::VectorSizeMismatch { got: v.len(), want });
        }
    }

    Ok(vectors)
}

/// Runs k-means `restarts` times with a deterministic seed stream and
/// returns the assignment of the lowest-inertia run, with labels compacted
/// to contiguous integers.
fn kmeans_best(
    vectors: &[Vec<f32>],
    k: usize,
    seed: u64,
    restarts: usize,
    max_iters: usize,
) -> Vec<usize> {
    let mut best: Option<(f32, Vec<usize>)> = None;

    for restart in 0..restarts.max(1) {
        let mut rng = fastrand::Rng::with_seed(seed.wrapping_add(restart as u64));
        let (assignments, inertia) = kmeans_run(vectors, k, &mut rng, max_iters);
        trace!("kmeans restart {restart}: inertia={inertia}");

        let better = match &best {
            Some((best_inertia, _)) => inertia < *best_inertia,
            None => true,
        };
        if better {
            best = Some((inertia, assignments));
        }
    }

    let (_, assignments) = best.unwrap_or((0.0, Vec::new()));
    compact_labels(&assignments, k)
}

/// One Lloyd run: random distinct init, assign/recompute to convergence.
fn kmeans_run(
    vectors: &[Vec<f32>],
    k: usize,
    rng: &mut fastrand::Rng,
    max_iters: usize,
) -> (Vec<usize>, f32) {
    let dim = vectors[0].len();

    // Init centroids from k distinct sentences.
    let mut indices: Vec<usize> = (0..vectors.len()).collect();
    rng.shuffle(&mut indices);
    let mut centroids: Vec<Vec<f32>> = indices[..k].iter().map(|&i| vectors[i].clone()).collect();

    let mut assignments: Vec<usize> = vec![0; vectors.len()];

    for _ in 0..max_iters {
        // Assign each point to its nearest centroid (ties: lowest index).
        let mut changed = false;
        for (i, v) in vectors.iter().enumerate() {
            let mut best_c = 0usize;
            let mut best_d = f32::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_distance(v, centroid);
                if d < best_d {
                    best_d = d;
                    best_c = c;
                }
            }
            if assignments[i] != best_c {
                assignments[i] = best_c;
                changed = true;
            }
        }

        if !changed {
            break;
        }

        // Recompute centroids as member means; an empty cluster keeps its
        // previous centroid and gets compacted away later if it stays empty.
        let mut sums: Vec<Vec<f32>> = vec![vec![0.0; dim]; k];
        let mut counts: Vec<usize> = vec![0; k];
        for (i, v) in vectors.iter().enumerate() {
            let c = assignments[i];
            counts[c] += 1;
            for (j, x) in v.iter().enumerate() {
                sums[c][j] += x;
            }
        }
        for c in 0..k {
            if counts[c] > 0 {
                for j in 0..dim {
                    centroids[c][j] = sums[c][j] / counts[c] as f32;
                }
            }
        }
    }

    let inertia = vectors
        .iter()
        .zip(&assignments)
        .map(|(v, &c)| squared_distance(v, &centroids[c]))
        .sum();

    (assignments, inertia)
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Remaps labels to contiguous `0..m` preserving ascending label order,
/// dropping labels that ended up with no members.
fn compact_labels(assignments: &[usize], k: usize) -> Vec<usize> {
    let mut present: Vec<bool> = vec![false; k];
    for &a in assignments {
        present[a] = true;
    }

    let mut remap: Vec<usize> = vec![0; k];
    let mut next = 0usize;
    for (label, &used) in present.iter().enumerate() {
        if used {
            remap[label] = next;
            next += 1;
        }
    }

    assignments.iter().map(|&a| remap[a]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_service::LlmError;
    use std::{future::Future, pin::Pin};

    /// Deterministic test provider: maps sentences onto fixed axes by topic
    /// keyword so cluster structure is known in advance.
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

    fn sentences(texts: &[&str]) -> Vec<Sentence> {
        texts
            .iter()
            .enumerate()
            .map(|(position, t)| Sentence {
                position,
                text: (*t).to_string(),
            })
            .collect()
    }

    #[test]
    fn kmeans_is_deterministic_for_fixed_seed() {
        let vectors = vec![
            vec![0.0, 0.1],
            vec![0.1, 0.0],
            vec![5.0, 5.1],
            vec![5.1, 5.0],
            vec![10.0, 0.0],
        ];
        let a = kmeans_best(&vectors, 3, 42, 10, 100);
        let b = kmeans_best(&vectors, 3, 42, 10, 100);
        assert_eq!(a, b);
    }

    #[test]
    fn kmeans_separates_well_spread_groups() {
        let vectors = vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![9.0, 9.0],
            vec![9.1, 9.1],
        ];
        let labels = kmeans_best(&vectors, 2, 42, 10, 100);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn compact_labels_are_contiguous() {
        // Labels 0 and 3 used out of k=4: must remap to 0 and 1.
        let compacted = compact_labels(&[3, 0, 3, 3], 4);
        assert_eq!(compacted, vec![1, 0, 1, 1]);
    }

    #[tokio::test]
    async fn cluster_count_is_bounded_by_sentence_count() {
        let s = sentences(&[
            "Cats are small mammals.",
            "Dogs are loyal mammals.",
            "Interest rates rose sharply today.",
        ]);
        let cfg = ChunkBuilderConfig::new_default(); // k = 5
        let labels = cluster_sentences(&s, &KeywordEmbedder, &cfg).await.unwrap();

        assert_eq!(labels.len(), 3);
        let distinct = {
            let mut l = labels.clone();
            l.sort_unstable();
            l.dedup();
            l.len()
        };
        assert!(distinct <= 3);
        // Contiguous label space.
        assert!(labels.iter().all(|&l| l < distinct));
    }

    #[tokio::test]
    async fn zero_sentences_produce_zero_labels() {
        let cfg = ChunkBuilderConfig::new_default();
        let labels = cluster_sentences(&[], &KeywordEmbedder, &cfg).await.unwrap();
        assert!(labels.is_empty());
    }

    #[tokio::test]
    async fn mismatched_embedding_dimensions_are_reported() {
        struct BrokenEmbedder;
        impl EmbeddingsProvider for BrokenEmbedder {
            fn embed<'a>(
                &'a self,
                text: &'a str,
            ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send + 'a>> {
                let v = if text.contains("long") {
                    vec![1.0, 0.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                };
                Box::pin(async move { Ok(v) })
            }
        }

        let s = sentences(&[
            "This one is a long sentence.",
            "This one is a short sentence.",
        ]);
        let cfg = ChunkBuilderConfig::new_default();
        let err = cluster_sentences(&s, &BrokenEmbedder, &cfg)
            .await
            .unwrap_err();
        assert!(matches!(err, ChunkError::VectorSizeMismatch { .. }));
    }
}
