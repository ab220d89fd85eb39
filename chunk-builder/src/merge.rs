//! Merges labeled sentences back into ordered chunks.

use std::collections::BTreeMap;

use crate::record::Chunk;
use crate::segment::Sentence;

/// Builds one [`Chunk`] per distinct cluster label.
///
/// Sentences sharing a label are restored to original document order
/// (cluster assignment order is arbitrary) and joined with single spaces.
/// Every input sentence lands in exactly one chunk; none are duplicated or
/// dropped. Chunks are returned in ascending label order, which is
/// incidental rather than meaningful.
///
/// Callers must pass one label per sentence; the two slices are parallel.
pub fn merge_chunks(sentences: &[Sentence], labels: &[usize]) -> Vec<Chunk> {
    debug_assert_eq!(sentences.len(), labels.len());

    let mut groups: BTreeMap<usize, Vec<(usize, &str)>> = BTreeMap::new();
    for (sentence, &label) in sentences.iter().zip(labels) {
        groups
            .entry(label)
            .or_default()
            .push((sentence.position, sentence.text.as_str()));
    }

    groups
        .into_iter()
        .map(|(cluster, mut members)| {
            sort_by_position(&mut members);
            let chunk_content = members
                .iter()
                .map(|(_, text)| *text)
                .collect::<Vec<_>>()
                .join(" ");
            Chunk {
                cluster,
                chunk_content,
            }
        })
        .collect()
}

/// Restores document order within one cluster group.
fn sort_by_position(members: &mut [(usize, &str)]) {
    members.sort_by_key(|(position, _)| *position);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(position: usize, text: &str) -> Sentence {
        Sentence {
            position,
            text: text.to_string(),
        }
    }

    #[test]
    fn every_sentence_appears_in_exactly_one_chunk() {
        let sentences = vec![
            sentence(0, "Cats are small mammals."),
            sentence(1, "The market fell today."),
            sentence(2, "Dogs are loyal mammals."),
        ];
        let chunks = merge_chunks(&sentences, &[0, 1, 0]);

        assert_eq!(chunks.len(), 2);
        let total: usize = sentences
            .iter()
            .map(|s| {
                chunks
                    .iter()
                    .filter(|c| c.chunk_content.contains(&s.text))
                    .count()
            })
            .sum();
        assert_eq!(total, sentences.len());
    }

    #[test]
    fn chunk_text_preserves_original_document_order() {
        // Positions 0, 2, 5 share a cluster; the merged text must read
        // 0 then 2 then 5, regardless of assignment order.
        let sentences = vec![
            sentence(5, "Third in the document here."),
            sentence(0, "First in the document here."),
            sentence(2, "Second in the document here."),
        ];
        let chunks = merge_chunks(&sentences, &[0, 0, 0]);

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].chunk_content,
            "First in the document here. Second in the document here. Third in the document here."
        );
    }

    #[test]
    fn chunks_come_out_in_ascending_label_order() {
        let sentences = vec![
            sentence(0, "Alpha sentence with enough tokens."),
            sentence(1, "Beta sentence with enough tokens."),
        ];
        let chunks = merge_chunks(&sentences, &[1, 0]);
        assert_eq!(chunks[0].cluster, 0);
        assert_eq!(chunks[1].cluster, 1);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(merge_chunks(&[], &[]).is_empty());
    }
}
