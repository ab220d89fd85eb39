use std::error::Error;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use llm_service::{LlmServiceProfiles, ProfileEmbedder};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Document QA over a semantic-chunk corpus: chunk, ingest, ask.
#[derive(Parser)]
#[command(name = "doc-rag", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build semantic chunks from extracted document records.
    Chunk {
        /// Directory of `*.json` document records.
        #[arg(long, default_value = "./processed_data")]
        input: String,
        /// Directory for `*_semantic_chunked.json` outputs.
        #[arg(long, default_value = "./semantic_chunks")]
        output: String,
        /// Target cluster count per document (overrides CLUSTER_COUNT).
        #[arg(long)]
        clusters: Option<usize>,
    },
    /// Embed chunk files and upsert them into the vector index.
    Ingest {
        /// Directory of chunk files produced by `chunk`.
        #[arg(long, default_value = "./semantic_chunks")]
        input: String,
    },
    /// Answer a question grounded on the indexed corpus.
    Ask {
        /// The question text.
        question: String,
        /// Retrieval window override (0 = size from query length).
        #[arg(long, default_value_t = 0)]
        top_k: u64,
    },
    /// Probe the configured model backends.
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from a .env file when present.
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();

    tracing_subscriber::registry()
        .with(filter)
        .with(llm_service::telemetry::fmt_layer())
        .init();

    let cli = Cli::parse();
    let svc = Arc::new(LlmServiceProfiles::from_env(Some(10))?);

    match cli.command {
        Commands::Chunk {
            input,
            output,
            clusters,
        } => {
            let mut cfg = chunk_builder::ChunkBuilderConfig::from_env();
            if let Some(k) = clusters {
                cfg.cluster_count = k;
            }
            let dim = rag_index::RagConfig::from_env().embedding_dim.unwrap_or(384);
            let embedder = ProfileEmbedder::new(svc.clone(), dim);

            let summary = chunk_builder::process_dir(&input, &output, &embedder, &cfg).await?;
            println!(
                "chunking done: processed={} skipped={} failed={}",
                summary.processed, summary.skipped, summary.failed
            );
        }
        Commands::Ingest { input } => {
            let cfg = rag_index::RagConfig::from_env();
            let dim = cfg.embedding_dim.unwrap_or(384);
            let embedder = ProfileEmbedder::new(svc.clone(), dim);

            let index = rag_index::RagIndex::new(cfg)?;
            let total = index.ingest_dir(&input, &embedder).await?;
            println!("ingested {total} chunks");
        }
        Commands::Ask { question, top_k } => {
            let question = question.trim().to_string();
            if question.is_empty() {
                return Err("query cannot be empty; please provide a valid query".into());
            }

            let qa = qa_gateway::ask_with_opts(
                &question,
                qa_gateway::AskOptions { top_k },
                svc.clone(),
            )
            .await?;

            println!("\n[route: {}]", qa.route);
            if qa.context.is_empty() {
                println!("[no relevant context found; answered from general knowledge]");
            } else {
                for (i, c) in qa.context.iter().enumerate() {
                    println!(
                        "--- chunk #{} (distance {:.3}, {}) ---",
                        i + 1,
                        c.distance,
                        c.file_name.as_deref().unwrap_or("unknown source")
                    );
                }
            }
            println!("\n{}", qa.answer);
        }
        Commands::Health => {
            let statuses = svc.health_all().await?;
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
    }

    Ok(())
}
