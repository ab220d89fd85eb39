//! Runtime configuration for chunk building.

use crate::errors::ChunkError;

/// Configuration for the segment → cluster → merge pipeline.
#[derive(Clone, Debug)]
pub struct ChunkBuilderConfig {
    /// Target cluster count `k`; the effective count is `min(k, sentences)`.
    pub cluster_count: usize,
    /// Minimum whitespace-token count for a sentence to be retained.
    /// A sentence is kept iff its token count is >= this value.
    pub min_sentence_tokens: usize,
    /// Fixed RNG seed for reproducible clustering.
    pub kmeans_seed: u64,
    /// Number of k-means restarts; the lowest-inertia run wins.
    pub kmeans_restarts: usize,
    /// Iteration cap per k-means run.
    pub kmeans_max_iters: usize,
    /// Maximum number of concurrent sentence-embedding requests.
    pub embed_concurrency: usize,
}

impl ChunkBuilderConfig {
    /// Creates the default configuration.
    pub fn new_default() -> Self {
        Self {
            cluster_count: 5,
            min_sentence_tokens: 4,
            kmeans_seed: 42,
            kmeans_restarts: 10,
            kmeans_max_iters: 100,
            embed_concurrency: 4,
        }
    }

    /// Builds the configuration from environment variables with defaults.
    ///
    /// Recognized variables: `CLUSTER_COUNT`, `MIN_SENTENCE_TOKENS`,
    /// `KMEANS_SEED`, `KMEANS_RESTARTS`, `KMEANS_MAX_ITERS`,
    /// `EMBEDDING_CONCURRENCY`.
    pub fn from_env() -> Self {
        let d = Self::new_default();
        Self {
            cluster_count: parse("CLUSTER_COUNT", d.cluster_count),
            min_sentence_tokens: parse("MIN_SENTENCE_TOKENS", d.min_sentence_tokens),
            kmeans_seed: parse("KMEANS_SEED", d.kmeans_seed),
            kmeans_restarts: parse("KMEANS_RESTARTS", d.kmeans_restarts),
            kmeans_max_iters: parse("KMEANS_MAX_ITERS", d.kmeans_max_iters),
            embed_concurrency: parse("EMBEDDING_CONCURRENCY", d.embed_concurrency),
        }
    }

    /// Validates config values once, at pipeline construction.
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.cluster_count == 0 {
            return Err(ChunkError::Config("cluster_count must be > 0".into()));
        }
        if self.min_sentence_tokens == 0 {
            return Err(ChunkError::Config("min_sentence_tokens must be > 0".into()));
        }
        if self.kmeans_restarts == 0 {
            return Err(ChunkError::Config("kmeans_restarts must be > 0".into()));
        }
        if self.kmeans_max_iters == 0 {
            return Err(ChunkError::Config("kmeans_max_iters must be > 0".into()));
        }
        if self.embed_concurrency == 0 {
            return Err(ChunkError::Config("embed_concurrency must be > 0".into()));
        }
        Ok(())
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
    fn defaults_match_documented_values() {
        let c = ChunkBuilderConfig::new_default();
        assert_eq!(c.cluster_count, 5);
        assert_eq!(c.min_sentence_tokens, 4);
        assert_eq!(c.kmeans_seed, 42);
        assert_eq!(c.kmeans_restarts, 10);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_cluster_count_is_rejected() {
        let mut c = ChunkBuilderConfig::new_default();
        c.cluster_count = 0;
        assert!(c.validate().is_err());
    }
}
