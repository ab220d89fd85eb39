//! Default LLM configs loaded from environment variables.
//!
//! This module provides convenience constructors for [`LlmModelConfig`],
//! one per service profile:
//!
//! - **General**       → default answer model for everyday queries
//! - **Code**          → model specialized for programming topics
//! - **Large-context** → model with a wide context window for long queries
//! - **Embedding**     → embedding generator
//!
//! # Environment variables
//!
//! Common:
//! - `OLLAMA_URL` or `OLLAMA_PORT` = endpoint (mandatory)
//! - `LLM_MAX_TOKENS`  = optional max tokens (u32)
//! - `GEN_TEMPERATURE` = sampling temperature for generation profiles
//!   (default `0.1`; kept low to favor faithfulness over creativity)
//!
//! Per profile (all optional, with defaults matching the shipped corpus):
//! - `OLLAMA_MODEL_GENERAL`   (default `llama3:latest`)
//! - `OLLAMA_MODEL_CODE`      (default `phi3:latest`)
//! - `OLLAMA_MODEL_LARGE_CTX` (default `qwen:7b`)
//! - `EMBEDDING_MODEL`        (default `all-minilm`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ConfigError, LlmError, env_opt_u32, env_or, validate_range_f32},
};

/// Resolves the Ollama endpoint strictly from environment.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
///
/// # Errors
///
/// - [`ConfigError::MissingVar`] if both are missing
/// - [`ConfigError::InvalidNumber`] if `OLLAMA_PORT` is invalid
fn ollama_endpoint() -> Result<String, LlmError> {
    if let Ok(url) = std::env::var("OLLAMA_URL") {
        if !url.trim().is_empty() {
            return Ok(url);
        }
    }
    if let Ok(port) = std::env::var("OLLAMA_PORT") {
        if !port.trim().is_empty() {
            let _ = port
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber {
                    var: "OLLAMA_PORT",
                    reason: "expected u16 (1..=65535)",
                })?;
            return Ok(format!("http://localhost:{port}"));
        }
    }
    Err(LlmError::Config(ConfigError::MissingVar(
        "OLLAMA_URL or OLLAMA_PORT",
    )))
}

/// Sampling temperature shared by the generation profiles.
///
/// Reads `GEN_TEMPERATURE` (default `0.1`) and validates the range.
fn generation_temperature() -> Result<f32, LlmError> {
    let t = std::env::var("GEN_TEMPERATURE")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.parse::<f32>().map_err(|_| ConfigError::InvalidNumber {
                var: "GEN_TEMPERATURE",
                reason: "expected f32",
            })
        })
        .transpose()?
        .unwrap_or(0.1);
    validate_range_f32("temperature", t, 0.0, 2.0)?;
    Ok(t)
}

fn generation_config(model: String) -> Result<LlmModelConfig, LlmError> {
    let endpoint = ollama_endpoint()?;
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let temperature = generation_temperature()?;

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        api_key: None,
        max_tokens,
        temperature: Some(temperature),
        top_p: None,
        timeout_secs: Some(120),
    })
}

/// Constructs a config for the **general** answer model.
///
/// # Env
/// - `OLLAMA_MODEL_GENERAL` (default `llama3:latest`)
pub fn config_ollama_general() -> Result<LlmModelConfig, LlmError> {
    generation_config(env_or("OLLAMA_MODEL_GENERAL", "llama3:latest"))
}

/// Constructs a config for the **code-specialized** model.
///
/// # Env
/// - `OLLAMA_MODEL_CODE` (default `phi3:latest`)
pub fn config_ollama_code() -> Result<LlmModelConfig, LlmError> {
    generation_config(env_or("OLLAMA_MODEL_CODE", "phi3:latest"))
}

/// Constructs a config for the **large-context** model used for long queries.
///
/// # Env
/// - `OLLAMA_MODEL_LARGE_CTX` (default `qwen:7b`)
pub fn config_ollama_large_ctx() -> Result<LlmModelConfig, LlmError> {
    generation_config(env_or("OLLAMA_MODEL_LARGE_CTX", "qwen:7b"))
}

/// Constructs a config for the **embedding** model.
///
/// The same model must embed chunks at ingestion time and queries at
/// retrieval time, otherwise the vector spaces do not match.
///
/// # Env
/// - `EMBEDDING_MODEL` (default `all-minilm`)
///
/// # Defaults
/// - `temperature = Some(0.0)` (deterministic)
/// - `max_tokens = None`
/// - `timeout_secs = Some(30)`
pub fn config_ollama_embedding() -> Result<LlmModelConfig, LlmError> {
    let endpoint = ollama_endpoint()?;
    let model = env_or("EMBEDDING_MODEL", "all-minilm");

    Ok(LlmModelConfig {
        provider: LlmProvider::Ollama,
        model,
        endpoint,
        api_key: None,
        max_tokens: None,
        temperature: Some(0.0),
        top_p: None,
        timeout_secs: Some(30),
    })
}
