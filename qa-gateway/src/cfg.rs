//! Runtime configuration loaded from environment variables.

use rag_index::RagConfig;

use crate::error::GatewayError;
use crate::route::RouterRules;
use crate::topk::TopKBuckets;

/// Config bag for the gateway. All fields have defaults via [`Self::from_env`];
/// values are validated once, at pipeline construction, rather than read ad
/// hoc mid-request.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Maximum distance at which a retrieved candidate is usable context.
    /// A fixed constant by design; it is not auto-tuned to the embedding
    /// distribution (see `RELEVANCE_THRESHOLD`).
    pub relevance_threshold: f32,
    /// Length-bucket table for retrieval-window sizing.
    pub topk: TopKBuckets,
    /// Model routing rules.
    pub router: RouterRules,
    /// Dimension of the embedding space shared with the index.
    pub embedding_dim: usize,

    // RagIndex config (host, collection, search mode)
    pub qdrant_url: String,
    pub qdrant_collection: String,
    pub rag_exact: bool,
}

impl GatewayConfig {
    /// Build from environment variables with the documented defaults.
    ///
    /// Recognized variables: `RELEVANCE_THRESHOLD`, `TOPK_SHORT_MAX`,
    /// `TOPK_MEDIUM_MAX`, `TOPK_SHORT`, `TOPK_MEDIUM`, `TOPK_LONG`,
    /// `ROUTE_LONG_QUERY_TOKENS`, `ROUTE_CODE_VOCAB` (comma-separated),
    /// `EMBEDDING_DIM`, `QDRANT_URL`, `QDRANT_COLLECTION`,
    /// `RAG_EXACT_SEARCH`.
    pub fn from_env() -> Self {
        let topk_defaults = TopKBuckets::default();
        let router_defaults = RouterRules::default();

        let code_vocabulary = std::env::var("ROUTE_CODE_VOCAB")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|t| t.trim().to_lowercase())
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|v| !v.is_empty())
            .unwrap_or(router_defaults.code_vocabulary);

        Self {
            relevance_threshold: parse("RELEVANCE_THRESHOLD", 1.0f32),
            topk: TopKBuckets {
                short_max: parse("TOPK_SHORT_MAX", topk_defaults.short_max),
                medium_max: parse("TOPK_MEDIUM_MAX", topk_defaults.medium_max),
                short_k: parse("TOPK_SHORT", topk_defaults.short_k),
                medium_k: parse("TOPK_MEDIUM", topk_defaults.medium_k),
                long_k: parse("TOPK_LONG", topk_defaults.long_k),
            },
            router: RouterRules {
                long_query_tokens: parse(
                    "ROUTE_LONG_QUERY_TOKENS",
                    router_defaults.long_query_tokens,
                ),
                code_vocabulary,
            },
            embedding_dim: parse("EMBEDDING_DIM", 384usize),

            qdrant_url: env("QDRANT_URL", "http://127.0.0.1:6334"),
            qdrant_collection: env("QDRANT_COLLECTION", "doc_chunks"),
            rag_exact: env("RAG_EXACT_SEARCH", "false") == "true",
        }
    }

    /// Validates the configuration once.
    pub fn validate(&self) -> Result<(), GatewayError> {
        if !self.relevance_threshold.is_finite() || self.relevance_threshold < 0.0 {
            return Err(GatewayError::Config(
                "relevance_threshold must be finite and >= 0".into(),
            ));
        }
        if self.topk.short_max >= self.topk.medium_max {
            return Err(GatewayError::Config(
                "topk buckets must satisfy short_max < medium_max".into(),
            ));
        }
        if self.topk.short_k == 0 || self.topk.medium_k == 0 || self.topk.long_k == 0 {
            return Err(GatewayError::Config("topk window sizes must be > 0".into()));
        }
        if self.router.code_vocabulary.is_empty() {
            return Err(GatewayError::Config("code vocabulary is empty".into()));
        }
        if self.embedding_dim == 0 {
            return Err(GatewayError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }

    /// Convert to a `rag_index::RagConfig` used by `RagIndex`.
    pub fn make_rag_config(&self) -> RagConfig {
        let mut cfg = RagConfig::from_env();
        cfg.qdrant_url = self.qdrant_url.clone();
        cfg.collection = self.qdrant_collection.clone();
        cfg.exact_search = self.rag_exact;
        cfg.embedding_dim = Some(self.embedding_dim);
        cfg
    }
}

fn env(k: &str, dflt: &str) -> String {
    match std::env::var(k) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => dflt.to_string(),
    }
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(dflt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_match_the_documented_values() {
        let cfg = GatewayConfig::from_env();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.relevance_threshold, 1.0);
        assert_eq!(cfg.topk.short_k, 5);
        assert_eq!(cfg.topk.medium_k, 50);
        assert_eq!(cfg.topk.long_k, 70);
        assert_eq!(cfg.router.long_query_tokens, 20);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let mut cfg = GatewayConfig::from_env();
        cfg.relevance_threshold = -0.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn inverted_buckets_are_rejected() {
        let mut cfg = GatewayConfig::from_env();
        cfg.topk.short_max = 20;
        cfg.topk.medium_max = 10;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rag_config_inherits_gateway_settings() {
        let cfg = GatewayConfig::from_env();
        let rag = cfg.make_rag_config();
        assert_eq!(rag.collection, cfg.qdrant_collection);
        assert_eq!(rag.embedding_dim, Some(cfg.embedding_dim));
    }
}
