//! Pipeline configuration.
//!
//! The environment is consulted only here, when the binary assembles its
//! config. Pipeline code receives the finished `MorphConfig` (and the API
//! credential) as parameters and never touches the process environment.

use std::time::Duration;

use completion::{CompletionError, HttpCompletionClient, DEFAULT_CHUNK_UNITS, DEFAULT_MAX_OUTPUT_TOKENS};

/// Top-level pipeline configuration.
#[derive(Debug, Clone)]
pub struct MorphConfig {
    /// Completion service base URL.
    pub base_url: String,
    /// Model requested for every stage.
    pub model: String,
    /// Per-call response-size cap, in output tokens.
    pub max_output_tokens: u32,
    /// Outbound HTTP timeout per request attempt.
    pub http_timeout: Duration,
    /// Chunk size in whitespace tokens.
    pub chunk_units: usize,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("MORPH_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("MORPH_MODEL").unwrap_or_else(|_| "gpt-4".into()),
            max_output_tokens: u32_from_env("MORPH_MAX_OUTPUT_TOKENS", DEFAULT_MAX_OUTPUT_TOKENS),
            http_timeout: Duration::from_secs(u64_from_env("MORPH_HTTP_TIMEOUT_SECS", 120)),
            chunk_units: usize_from_env("MORPH_CHUNK_UNITS", DEFAULT_CHUNK_UNITS),
        }
    }
}

impl MorphConfig {
    /// Build the production completion client for this config.
    pub fn client(&self) -> Result<HttpCompletionClient, CompletionError> {
        HttpCompletionClient::new(&self.base_url, self.http_timeout, self.max_output_tokens)
    }
}

fn u32_from_env(var: &str, default: u32) -> u32 {
    std::env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn u64_from_env(var: &str, default: u64) -> u64 {
    std::env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn usize_from_env(var: &str, default: usize) -> usize {
    std::env::var(var).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_helpers_fall_back_on_missing_or_garbage() {
        // Var names are unique to this test, so no cross-test interference.
        std::env::remove_var("MORPH_CFG_TEST_UNSET");
        assert_eq!(u32_from_env("MORPH_CFG_TEST_UNSET", 7), 7);

        std::env::set_var("MORPH_CFG_TEST_GARBAGE", "not-a-number");
        assert_eq!(u64_from_env("MORPH_CFG_TEST_GARBAGE", 9), 9);

        std::env::set_var("MORPH_CFG_TEST_SET", "42");
        assert_eq!(usize_from_env("MORPH_CFG_TEST_SET", 7), 42);
    }

    #[test]
    fn test_client_builds_from_explicit_config() {
        let config = MorphConfig {
            base_url: "https://example.invalid/v1".into(),
            model: "gpt-4".into(),
            max_output_tokens: 4000,
            http_timeout: Duration::from_secs(30),
            chunk_units: 2700,
        };
        assert!(config.client().is_ok());
    }
}
