//! Runtime and collection configuration.

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance.
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2). Default: the corpus index is an L2 space,
    /// which keeps the relevance threshold directly comparable.
    Euclid,
}

/// Describes the vector space of the collection.
#[derive(Clone, Debug)]
pub struct VectorSpace {
    /// Dimensionality of vectors.
    pub size: usize,
    /// Distance function.
    pub distance: DistanceKind,
}

/// Configuration for index ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Qdrant endpoint, e.g. `http://127.0.0.1:6334`.
    pub qdrant_url: String,
    /// Optional API key for Qdrant Cloud.
    pub qdrant_api_key: Option<String>,
    /// Target collection name.
    pub collection: String,
    /// Distance function (Euclid by default).
    pub distance: DistanceKind,
    /// Upsert batch size (typical range: 128..512).
    pub upsert_batch: usize,
    /// Exact search flag (false = HNSW ANN).
    pub exact_search: bool,
    /// Expected embedding dimension; enforced when set.
    pub embedding_dim: Option<usize>,
    /// Concurrency bound for on-the-fly embedding during ingestion.
    pub embedding_concurrency: Option<usize>,
}

impl RagConfig {
    /// Creates a sane default config for a given collection name and Qdrant endpoint.
    pub fn new_default(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            qdrant_url: url.into(),
            qdrant_api_key: None,
            collection: collection.into(),
            distance: DistanceKind::Euclid,
            upsert_batch: 256,
            exact_search: false,
            embedding_dim: None,
            embedding_concurrency: None,
        }
    }

    /// Builds the configuration from environment variables with defaults.
    ///
    /// Recognized variables: `QDRANT_URL`, `QDRANT_API_KEY`,
    /// `QDRANT_COLLECTION`, `QDRANT_BATCH_SIZE`, `RAG_EXACT_SEARCH`,
    /// `EMBEDDING_DIM`, `EMBEDDING_CONCURRENCY`.
    pub fn from_env() -> Self {
        let mut cfg = Self::new_default(
            env_or("QDRANT_URL", "http://127.0.0.1:6334"),
            env_or("QDRANT_COLLECTION", "doc_chunks"),
        );
        cfg.qdrant_api_key = std::env::var("QDRANT_API_KEY").ok();
        cfg.upsert_batch = parse("QDRANT_BATCH_SIZE", cfg.upsert_batch);
        cfg.exact_search = env_or("RAG_EXACT_SEARCH", "false") == "true";
        cfg.embedding_dim = std::env::var("EMBEDDING_DIM")
            .ok()
            .and_then(|s| s.parse::<usize>().ok());
        cfg.embedding_concurrency = std::env::var("EMBEDDING_CONCURRENCY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok());
        cfg
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.qdrant_url.trim().is_empty() {
            return Err(RagError::Config("qdrant_url is empty".into()));
        }
        if self.collection.trim().is_empty() {
            return Err(RagError::Config("collection is empty".into()));
        }
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        if self.embedding_dim == Some(0) {
            return Err(RagError::Config("embedding_dim must be > 0".into()));
        }
        Ok(())
    }
}

fn env_or(k: &str, dflt: &str) -> String {
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
    fn default_config_is_valid() {
        let cfg = RagConfig::new_default("http://127.0.0.1:6334", "doc_chunks");
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.distance, DistanceKind::Euclid);
        assert_eq!(cfg.upsert_batch, 256);
    }

    #[test]
    fn empty_collection_is_rejected() {
        let cfg = RagConfig::new_default("http://127.0.0.1:6334", "  ");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_batch_is_rejected() {
        let mut cfg = RagConfig::new_default("http://127.0.0.1:6334", "doc_chunks");
        cfg.upsert_batch = 0;
        assert!(cfg.validate().is_err());
    }
}
