//! Universal health service for LLM backends.
//!
//! This module exposes lightweight health checks for supported providers:
//! - Ollama: `GET {endpoint}/api/tags` (best-effort model existence check)
//!
//! The returned [`HealthStatus`] is JSON-serializable and suitable for CLI
//! output or a health endpoint. [`HealthService::check`] is resilient and
//! never fails (errors mapped to `ok=false`); the provider-specific probe
//! returns a strict `Result`.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::config::llm_provider::LlmProvider;
use crate::error_handler::{HealthError, LlmError, make_snippet};

/// A serializable health snapshot for a single provider/config.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g., "Ollama").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Optional model identifier relevant to the probe (if any).
    pub model: Option<String>,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds for the main probe.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn from_probe(
        cfg: &LlmModelConfig,
        ok: bool,
        latency_ms: u128,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: Some(cfg.model.clone()),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// A universal health checker that reuses a single HTTP client.
///
/// The client is constructed with a default timeout. Individual probes may
/// override the timeout per request based on the provided config.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a checker with the given default timeout (seconds).
    ///
    /// # Errors
    /// Returns [`LlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(default_timeout_secs: Option<u64>) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(default_timeout_secs.unwrap_or(5));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Checks a single config; errors are folded into a failed status.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let started = Instant::now();
        let res = match cfg.provider {
            LlmProvider::Ollama => self.try_ollama(cfg).await,
        };
        let latency_ms = started.elapsed().as_millis();

        match res {
            Ok(msg) => HealthStatus::from_probe(cfg, true, latency_ms, msg),
            Err(e) => {
                warn!("health check failed for {}: {e}", cfg.endpoint);
                HealthStatus::from_probe(cfg, false, latency_ms, e.to_string())
            }
        }
    }

    /// Checks many configs sequentially, preserving input order.
    pub async fn check_many(&self, cfgs: &[LlmModelConfig]) -> Vec<HealthStatus> {
        let mut out = Vec::with_capacity(cfgs.len());
        for cfg in cfgs {
            out.push(self.check(cfg).await);
        }
        out
    }

    /// Strict Ollama probe: `GET {endpoint}/api/tags`.
    ///
    /// # Errors
    /// - [`HealthError::InvalidEndpoint`] for malformed endpoints
    /// - [`HealthError::HttpStatus`] for non-2xx responses
    /// - [`LlmError::HttpTransport`] for transport failures
    async fn try_ollama(&self, cfg: &LlmModelConfig) -> Result<String, LlmError> {
        let endpoint = cfg.endpoint.trim();
        if endpoint.is_empty()
            || !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }

        let url = format!("{}/api/tags", endpoint.trim_end_matches('/'));
        debug!("GET {url}");

        let mut req = self.client.get(&url);
        if let Some(secs) = cfg.timeout_secs {
            req = req.timeout(Duration::from_secs(secs));
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus {
                status,
                url,
                snippet: make_snippet(&body),
            }
            .into());
        }

        // Best-effort model existence check over the tags listing.
        let body = resp.text().await.unwrap_or_default();
        if body.contains(&cfg.model) {
            Ok(format!("model '{}' available", cfg.model))
        } else {
            Ok(format!(
                "endpoint reachable; model '{}' not listed",
                cfg.model
            ))
        }
    }
}
