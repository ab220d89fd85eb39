//! Model routing: maps query features onto a generation backend.

use llm_service::ModelRoute;
use tracing::debug;

/// Routing rules, a configuration surface rather than hardcoded logic.
///
/// Rules fire in fixed precedence: query length first, then the code
/// vocabulary, then the general default. Exactly one rule fires.
#[derive(Clone, Debug)]
pub struct RouterRules {
    /// Token count above which the large-context route wins.
    pub long_query_tokens: usize,
    /// Tokens that indicate a programming topic (matched case-insensitively).
    pub code_vocabulary: Vec<String>,
}

impl Default for RouterRules {
    fn default() -> Self {
        Self {
            long_query_tokens: 20,
            code_vocabulary: ["code", "program", "error", "bug", "syntax", "compile"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Selects the generation route for `query`.
///
/// Deterministic for identical query text and rules, and independent of
/// retrieval results: the route is a function of the query alone.
pub fn select_route(query: &str, rules: &RouterRules) -> ModelRoute {
    let tokens: Vec<String> = query
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .collect();

    let route = if tokens.len() > rules.long_query_tokens {
        ModelRoute::LargeContext
    } else if tokens
        .iter()
        .any(|t| rules.code_vocabulary.iter().any(|v| v == t))
    {
        ModelRoute::CodeSpecialized
    } else {
        ModelRoute::General
    };

    debug!("select_route: {} tokens -> {route}", tokens.len());
    route
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_queries_win_over_code_vocabulary() {
        let query = (0..21).map(|_| "code").collect::<Vec<_>>().join(" ");
        assert_eq!(
            select_route(&query, &RouterRules::default()),
            ModelRoute::LargeContext
        );
    }

    #[test]
    fn code_vocabulary_matches_case_insensitively() {
        assert_eq!(
            select_route("why does my Program crash", &RouterRules::default()),
            ModelRoute::CodeSpecialized
        );
        assert_eq!(
            select_route("what is a SYNTAX tree", &RouterRules::default()),
            ModelRoute::CodeSpecialized
        );
    }

    #[test]
    fn vocabulary_matches_whole_tokens_only() {
        // "decode" contains "code" but is not the token "code".
        assert_eq!(
            select_route("how do I decode a file", &RouterRules::default()),
            ModelRoute::General
        );
    }

    #[test]
    fn everything_else_routes_to_general() {
        assert_eq!(
            select_route("where is the admin panel", &RouterRules::default()),
            ModelRoute::General
        );
    }

    #[test]
    fn identical_query_always_yields_identical_route() {
        let rules = RouterRules::default();
        let q = "how do I fix this bug";
        assert_eq!(select_route(q, &rules), select_route(q, &rules));
        assert_eq!(select_route(q, &rules), ModelRoute::CodeSpecialized);
    }
}
