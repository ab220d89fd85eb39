//! Query pipeline with a single public entry point.
//!
//! Public API: [`ask`] / [`ask_with_opts`]. Given a user question, the
//! gateway sizes the retrieval window from the query length, embeds the
//! question, retrieves candidates from `rag-index`, filters them by the
//! relevance threshold, selects a generation route, builds a grounded
//! prompt (or the general-knowledge fallback), calls the LLM service, and
//! returns the answer together with the exact context used.
//!
//! Each request owns its query, candidates, route, and prompt end to end;
//! nothing is shared across requests except the injected service handles.

mod api_types;
mod cfg;
mod error;
mod filter;
mod progress;
mod prompt;
mod route;
mod topk;

pub use api_types::{AskOptions, QaAnswer, UsedChunk};
pub use cfg::GatewayConfig;
pub use error::GatewayError;
pub use filter::filter_relevant;
pub use progress::{IndicatifProgress, NoopProgress, Progress};
pub use prompt::{CONTEXT_HEADER, assemble_prompt, build_fallback_prompt, build_grounded_prompt};
pub use route::{RouterRules, select_route};
pub use topk::{TopKBuckets, estimate_top_k};

use std::sync::Arc;

use llm_service::{LlmServiceProfiles, ProfileEmbedder};
use rag_index::{ChunkQuery, RagIndex};
use tracing::{debug, info};

/// Ask with retrieval augmentation and get the final answer as plain text.
///
/// This is a convenience wrapper over [`ask_with_opts`] with automatic
/// retrieval-window sizing.
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # use llm_service::LlmServiceProfiles;
/// # #[tokio::main] async fn main() {
/// let svc = Arc::new(LlmServiceProfiles::from_env(Some(10)).unwrap());
/// let answer = qa_gateway::ask("Where is the admin panel?", svc).await.unwrap();
/// println!("{answer}");
/// # }
/// ```
pub async fn ask(question: &str, svc: Arc<LlmServiceProfiles>) -> Result<String, GatewayError> {
    let qa = ask_with_opts(question, AskOptions::default(), svc).await?;
    Ok(qa.answer)
}

/// Ask with retrieval augmentation and get both answer and used context.
///
/// Stages: estimate top-k → retrieve → relevance-filter → route → assemble
/// prompt → generate. An empty retrieval or filter result falls back to a
/// general-knowledge prompt rather than failing the request; backend
/// failures propagate as [`GatewayError`], never as a fabricated answer.
///
/// # Errors
/// Propagates configuration, embedding, retrieval, and generation errors.
pub async fn ask_with_opts(
    question: &str,
    opts: AskOptions,
    svc: Arc<LlmServiceProfiles>,
) -> Result<QaAnswer, GatewayError> {
    let prog = IndicatifProgress::spinner();

    // 1) Load + validate config once per request
    prog.message("loading config");
    let gcfg = GatewayConfig::from_env();
    gcfg.validate()?;

    // Resolve the retrieval window (0 => length-bucket heuristic)
    let top_k = if opts.top_k == 0 {
        estimate_top_k(question, &gcfg.topk)
    } else {
        opts.top_k
    };
    debug!("ask: top_k={top_k}");

    // 2) Create facades
    prog.step("creating index and embedder");
    let index = RagIndex::new(gcfg.make_rag_config())?;
    let embedder = ProfileEmbedder::new(svc.clone(), gcfg.embedding_dim);

    // 3) Retrieve
    prog.step("embedding + retrieving candidates");
    let query = ChunkQuery {
        text: question,
        top_k,
    };
    let candidates = index.chunk_context(query, &embedder).await?;
    info!("ask: retrieved {} candidates", candidates.len());

    // 4) Relevance filter (inclusive threshold)
    let kept = filter_relevant(candidates, gcfg.relevance_threshold);

    // 5) Route selection: a function of the query alone
    let route = select_route(question, &gcfg.router);
    info!("ask: using route {route}");

    // 6) Assemble prompt + generate
    prog.step("assembling prompt");
    let prompt_text = assemble_prompt(&kept, question);
    prog.step("generating answer");
    let answer = svc.generate(route, &prompt_text).await?;

    // 7) Convert used context for callers
    prog.finish("done");
    let context = kept
        .into_iter()
        .map(|c| UsedChunk {
            distance: c.distance,
            file_name: c.file_name,
            text: c.text,
        })
        .collect();

    Ok(QaAnswer {
        answer,
        route,
        context,
    })
}
