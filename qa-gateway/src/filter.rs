//! Relevance filtering over retrieved candidates.

use rag_index::RetrievedChunk;
use tracing::debug;

/// Keeps candidates whose distance is within `threshold` (inclusive),
/// preserving retrieval order.
///
/// Refusing to ground on distant matches protects answer quality; narrow or
/// unusual queries can legitimately end up with nothing, in which case the
/// pipeline falls back to an unconditioned prompt instead of failing.
pub fn filter_relevant(candidates: Vec<RetrievedChunk>, threshold: f32) -> Vec<RetrievedChunk> {
    let before = candidates.len();
    let kept: Vec<RetrievedChunk> = candidates
        .into_iter()
        .filter(|c| c.distance <= threshold)
        .collect();
    debug!(
        "filter_relevant: kept {}/{} candidates at threshold {:.3}",
        kept.len(),
        before,
        threshold
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(distance: f32, text: &str) -> RetrievedChunk {
        RetrievedChunk {
            distance,
            text: text.into(),
            file_name: None,
            payload: json!({}),
        }
    }

    #[test]
    fn distance_equal_to_threshold_is_retained() {
        let kept = filter_relevant(vec![candidate(1.0, "boundary")], 1.0);
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn distance_just_above_threshold_is_dropped() {
        let kept = filter_relevant(vec![candidate(1.0 + f32::EPSILON, "far")], 1.0);
        assert!(kept.is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let kept = filter_relevant(
            vec![
                candidate(0.1, "first"),
                candidate(2.0, "dropped"),
                candidate(0.5, "second"),
            ],
            1.0,
        );
        let texts: Vec<&str> = kept.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second"]);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(filter_relevant(Vec::new(), 1.0).is_empty());
    }
}
