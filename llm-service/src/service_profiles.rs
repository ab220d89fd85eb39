//! Shared LLM service with four active profiles: `general`, `code`,
//! `large-context`, and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+key+timeout).
//! - Provides convenience methods to generate via a [`ModelRoute`] and to
//!   compute embeddings.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use llm_service::service_profiles::{LlmServiceProfiles, ModelRoute};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), llm_service::LlmError> {
//!     let svc = Arc::new(LlmServiceProfiles::from_env(Some(10))?);
//!
//!     let txt = svc.generate(ModelRoute::General, "Hello world").await?;
//!     println!("ANSWER: {}", txt);
//!
//!     let emb = svc.embed("Ferris").await?;
//!     println!("Embedding dim = {}", emb.len());
//!
//!     Ok(())
//! }
//! ```

use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
    sync::Arc,
};

use tokio::sync::RwLock;

use crate::config::default_config::{
    config_ollama_code, config_ollama_embedding, config_ollama_general, config_ollama_large_ctx,
};
use crate::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
use crate::error_handler::LlmError;
use crate::health_service::{HealthService, HealthStatus};
use crate::services::ollama_service::OllamaService;

/// Identifier of the generation backend answering one request.
///
/// A route is chosen once per request by the query pipeline and maps onto
/// one of the generation profiles held by [`LlmServiceProfiles`]. Routes are
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelRoute {
    /// Default general-purpose model.
    General,
    /// Model specialized for programming topics.
    CodeSpecialized,
    /// Wide-context model for long, multi-part queries.
    LargeContext,
}

impl std::fmt::Display for ModelRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelRoute::General => write!(f, "general"),
            ModelRoute::CodeSpecialized => write!(f, "code-specialized"),
            ModelRoute::LargeContext => write!(f, "large-context"),
        }
    }
}

/// Shared service that manages the generation profiles and the embedding
/// profile.
///
/// Internally, it caches Ollama clients keyed by their configuration to
/// avoid recreating HTTP clients on each call.
pub struct LlmServiceProfiles {
    general: LlmModelConfig,
    code: LlmModelConfig,
    large_ctx: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates a new service with explicit profile configs.
    ///
    /// - `general`: required default answer profile.
    /// - `code`: profile for programming queries.
    /// - `large_ctx`: profile for long queries.
    /// - `embedding`: required embedding profile.
    /// - `health_timeout_secs`: optional timeout for the health checker.
    pub fn new(
        general: LlmModelConfig,
        code: LlmModelConfig,
        large_ctx: LlmModelConfig,
        embedding: LlmModelConfig,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            general,
            code,
            large_ctx,
            embedding,
            ollama: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Creates the service from environment-driven default configs.
    ///
    /// # Errors
    /// Returns [`LlmError::Config`] if a mandatory variable is missing or
    /// malformed (see [`crate::config::default_config`]).
    pub fn from_env(health_timeout_secs: Option<u64>) -> Result<Self, LlmError> {
        Self::new(
            config_ollama_general()?,
            config_ollama_code()?,
            config_ollama_large_ctx()?,
            config_ollama_embedding()?,
            health_timeout_secs,
        )
    }

    /// Generates text using the profile selected by `route`.
    ///
    /// # Errors
    /// Returns [`LlmError`] if generation fails; backend failures propagate
    /// as distinguishable errors, never as fabricated answers.
    pub async fn generate(&self, route: ModelRoute, prompt: &str) -> Result<String, LlmError> {
        let cfg = self.route_config(route);
        self.generate_with(cfg, prompt).await
    }

    /// Computes embeddings using the **embedding** profile.
    ///
    /// The same profile must be used for chunk ingestion and query
    /// retrieval; mixing models invalidates the vector space.
    ///
    /// # Errors
    /// Returns [`LlmError`] if embedding fails.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, LlmError> {
        match self.embedding.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.embedding).await?;
                cli.embeddings(input).await.map_err(LlmError::from)
            }
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    ///
    /// Profiles sharing a config are checked only once.
    pub async fn health_all(&self) -> Result<Vec<HealthStatus>, LlmError> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(4);
        for cfg in [&self.general, &self.code, &self.large_ctx, &self.embedding] {
            if !list.contains(cfg) {
                list.push(cfg.clone());
            }
        }
        Ok(self.health.check_many(&list).await)
    }

    /// Returns the config backing a given route.
    pub fn route_config(&self, route: ModelRoute) -> &LlmModelConfig {
        match route {
            ModelRoute::General => &self.general,
            ModelRoute::CodeSpecialized => &self.code,
            ModelRoute::LargeContext => &self.large_ctx,
        }
    }

    /// Returns the embedding profile config.
    pub fn embedding_config(&self) -> &LlmModelConfig {
        &self.embedding
    }

    /* --------------------- Internals --------------------- */

    async fn generate_with(&self, cfg: &LlmModelConfig, prompt: &str) -> Result<String, LlmError> {
        match cfg.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(cfg).await?;
                cli.generate(prompt).await.map_err(LlmError::from)
            }
        }
    }

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, LlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key).cloned() {
            return Ok(cli);
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Internal cache key to identify unique client configs.
#[derive(Clone, Eq)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
        }
    }
}

impl PartialEq for ClientKey {
    fn eq(&self, other: &Self) -> bool {
        self.provider == other.provider
            && self.endpoint == other.endpoint
            && self.model == other.model
            && self.api_key == other.api_key
            && self.timeout == other.timeout
    }
}

impl Hash for ClientKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.provider.hash(state);
        self.endpoint.hash(state);
        self.model.hash(state);
        if let Some(ref k) = self.api_key {
            k.hash(state);
        } else {
            0usize.hash(state);
        }
        self.timeout.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(model: &str) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Ollama,
            model: model.into(),
            endpoint: "http://localhost:11434".into(),
            api_key: None,
            max_tokens: None,
            temperature: Some(0.1),
            top_p: None,
            timeout_secs: Some(30),
        }
    }

    #[test]
    fn route_config_maps_each_route() {
        let svc = LlmServiceProfiles::new(
            cfg("llama3:latest"),
            cfg("phi3:latest"),
            cfg("qwen:7b"),
            cfg("all-minilm"),
            None,
        )
        .unwrap();

        assert_eq!(svc.route_config(ModelRoute::General).model, "llama3:latest");
        assert_eq!(
            svc.route_config(ModelRoute::CodeSpecialized).model,
            "phi3:latest"
        );
        assert_eq!(svc.route_config(ModelRoute::LargeContext).model, "qwen:7b");
        assert_eq!(svc.embedding_config().model, "all-minilm");
    }

    #[test]
    fn client_key_dedupes_identical_configs() {
        let a = ClientKey::from(&cfg("llama3:latest"));
        let b = ClientKey::from(&cfg("llama3:latest"));
        let c = ClientKey::from(&cfg("phi3:latest"));
        assert!(a == b);
        assert!(a != c);
    }
}
