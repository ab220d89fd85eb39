/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// Generation backends in this system are Ollama models selected per route,
/// so a single provider variant is enough today. Adding remote providers in
/// the future (e.g., OpenAI, Anthropic) is done by extending this enum and
/// matching on it in `LlmServiceProfiles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Local Ollama runtime for on-device inference.
    Ollama,
}
