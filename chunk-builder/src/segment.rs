//! Sentence segmentation with a minimum-length filter.

use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// A sentence retained for clustering, carrying its original ordinal
/// position within the document's raw sentence split.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sentence {
    /// Ordinal of this sentence in the raw split, assigned before filtering.
    pub position: usize,
    /// Trimmed sentence text.
    pub text: String,
}

/// Splits `text` into sentences and filters out fragments shorter than
/// `min_tokens` whitespace-delimited tokens.
///
/// Boundaries follow UAX #29 sentence segmentation, which handles
/// abbreviations and non-Latin scripts better than punctuation scanning.
/// With the default minimum of 4, every retained sentence has a token
/// count > 3.
///
/// An empty result means the document has no clusterable content; callers
/// skip such documents rather than treating them as errors.
pub fn segment_sentences(text: &str, min_tokens: usize) -> Vec<Sentence> {
    let mut out = Vec::new();
    for (position, raw) in text.unicode_sentences().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.split_whitespace().count() < min_tokens {
            continue;
        }
        out.push(Sentence {
            position,
            text: trimmed.to_string(),
        });
    }
    debug!("segment_sentences: retained {} sentences", out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_sentences_with_three_or_fewer_tokens() {
        let text = "Too short. Cats are friendly mammals. No. This sentence has enough tokens.";
        let sentences = segment_sentences(text, 4);
        assert!(sentences.iter().all(|s| s.text.split_whitespace().count() > 3));
        assert!(sentences.iter().all(|s| !s.text.contains("Too short")));
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn positions_reflect_the_raw_split() {
        let text = "Short one. Cats are friendly mammals indeed. Nope. Dogs are loyal mammals too.";
        let sentences = segment_sentences(text, 4);
        // Retained sentences keep their pre-filter ordinals, so gaps remain.
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].position < sentences[1].position);
        assert_eq!(sentences[0].position, 1);
        assert_eq!(sentences[1].position, 3);
    }

    #[test]
    fn empty_and_whitespace_input_yield_nothing() {
        assert!(segment_sentences("", 4).is_empty());
        assert!(segment_sentences("   \n\t  ", 4).is_empty());
    }

    #[test]
    fn exactly_min_tokens_is_retained() {
        let sentences = segment_sentences("One two three four.", 4);
        assert_eq!(sentences.len(), 1);
    }
}
