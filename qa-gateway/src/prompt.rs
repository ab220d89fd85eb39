//! Prompt builder: grounded template and general-knowledge fallback.

use rag_index::RetrievedChunk;

/// Header introducing the grounding context section.
///
/// The fallback prompt must never contain this header; downstream checks
/// rely on its absence to tell the two prompt shapes apart.
pub const CONTEXT_HEADER: &str = "=== Context ===";

/// Builds the grounded prompt from retained candidates.
///
/// Context texts are joined with blank-line separators in retrieval order,
/// then embedded into a fixed instruction template together with the
/// question.
pub fn build_grounded_prompt(candidates: &[RetrievedChunk], question: &str) -> String {
    let context = candidates
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Use the following context to answer the user's question as accurately as possible.\n\
         \n\
         {CONTEXT_HEADER}\n\
         {context}\n\
         \n\
         === Question ===\n\
         {question}\n\
         \n\
         === Answer ===\n"
    )
}

/// Builds the unconditioned fallback prompt used when no candidate survives
/// relevance filtering: the backend answers from general knowledge and must
/// not cite retrieved context.
pub fn build_fallback_prompt(question: &str) -> String {
    format!("Answer based on your general knowledge: {question}")
}

/// Assembles the final prompt for one request: grounded when any candidate
/// survived filtering, fallback otherwise.
pub fn assemble_prompt(candidates: &[RetrievedChunk], question: &str) -> String {
    if candidates.is_empty() {
        build_fallback_prompt(question)
    } else {
        build_grounded_prompt(candidates, question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(text: &str) -> RetrievedChunk {
        RetrievedChunk {
            distance: 0.2,
            text: text.into(),
            file_name: None,
            payload: json!({}),
        }
    }

    #[test]
    fn grounded_prompt_contains_context_and_question() {
        let prompt = build_grounded_prompt(
            &[candidate("Cats are small mammals."), candidate("Dogs too.")],
            "What are cats?",
        );
        assert!(prompt.contains(CONTEXT_HEADER));
        assert!(prompt.contains("Cats are small mammals.\n\nDogs too."));
        assert!(prompt.contains("What are cats?"));
    }

    #[test]
    fn grounded_prompt_preserves_retrieval_order() {
        let prompt = build_grounded_prompt(&[candidate("first"), candidate("second")], "q");
        let first = prompt.find("first").unwrap();
        let second = prompt.find("second").unwrap();
        assert!(first < second);
    }

    #[test]
    fn fallback_prompt_has_no_context_header_and_quotes_the_query() {
        let prompt = build_fallback_prompt("how do I reset my password");
        assert!(!prompt.contains(CONTEXT_HEADER));
        assert!(prompt.contains("how do I reset my password"));
    }

    #[test]
    fn empty_candidate_set_always_assembles_the_fallback() {
        let prompt = assemble_prompt(&[], "where is the admin panel");
        assert!(!prompt.contains(CONTEXT_HEADER));
        assert!(prompt.contains("where is the admin panel"));

        let grounded = assemble_prompt(&[candidate("some context")], "where is the admin panel");
        assert!(grounded.contains(CONTEXT_HEADER));
    }
}
