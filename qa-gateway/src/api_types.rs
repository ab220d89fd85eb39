//! Public API types re-used by external callers (e.g., the CLI).

use llm_service::ModelRoute;
use serde::Serialize;

/// Options that control retrieval for a single question.
///
/// Setting a field to `0` means: "derive the value automatically".
#[derive(Clone, Debug, Default)]
pub struct AskOptions {
    /// Retrieval window size. If `0`, the gateway sizes the window from the
    /// query's token count (the length-bucket heuristic).
    pub top_k: u64,
}

/// A compact record of a context chunk that was fed to the LLM.
#[derive(Clone, Debug, Serialize)]
pub struct UsedChunk {
    /// Dissimilarity to the query (lower = more similar).
    pub distance: f32,
    /// Source document name, when the payload carried one.
    pub file_name: Option<String>,
    /// Chunk text as it appeared in the prompt.
    pub text: String,
}

/// Final answer together with the route taken and the exact context passed
/// to the model. An empty `context` means the answer came from general
/// knowledge (relevance filtering left nothing usable).
#[derive(Clone, Debug, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub route: ModelRoute,
    pub context: Vec<UsedChunk>,
}
