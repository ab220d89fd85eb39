//! Semantic chunk construction for the document QA pipeline.
//!
//! This crate turns a document's raw text into a small number of
//! topic-coherent passages ("chunks"):
//!
//! 1. [`segment`] splits text into sentences and drops fragments too short
//!    to carry meaning.
//! 2. [`cluster`] embeds every sentence and groups them by latent topic with
//!    seeded multi-restart k-means.
//! 3. [`merge`] concatenates each group back in original document order.
//!
//! [`process`] drives the per-file pipeline over a directory of extracted
//! document records and persists the resulting chunk records as JSON.
//!
//! Nothing is shared across documents; each file-processing call owns its
//! sentences, embeddings, and labels end to end.

mod cluster;
mod config;
mod errors;
mod merge;
mod process;
mod record;
mod segment;

pub use cluster::cluster_sentences;
pub use config::ChunkBuilderConfig;
pub use errors::ChunkError;
pub use merge::merge_chunks;
pub use process::{BatchSummary, process_dir, process_document};
pub use record::{Chunk, ChunkRecord, DocumentRecord, chunked_file_name};
pub use segment::{Sentence, segment_sentences};
