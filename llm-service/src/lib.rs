//! Shared LLM service used by every pipeline stage that talks to a model.
//!
//! The crate bundles:
//! - Provider configuration ([`config`]) with env-driven defaults per profile.
//! - A thin non-streaming Ollama client ([`services::ollama_service`]).
//! - [`service_profiles::LlmServiceProfiles`]: one handle, four profiles
//!   (`general`, `code`, `large-context`, `embedding`), cached HTTP clients.
//! - The [`embeddings::EmbeddingsProvider`] trait shared by chunk building,
//!   index ingestion, and query-time retrieval.
//! - Health checks and a unified error type.
//!
//! Construct the service once, wrap it in `Arc`, and pass clones to
//! dependents.

pub mod config;
pub mod embeddings;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;

pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use embeddings::{EmbeddingsProvider, NoopEmbedder, ProfileEmbedder};
pub use error_handler::{ConfigError, HealthError, LlmError};
pub use service_profiles::{LlmServiceProfiles, ModelRoute};
