//! Completion error taxonomy with retry classification.
//!
//! Every failure the completion layer can produce is represented here.
//! Callers query `is_retriable()` instead of string-matching messages.
//!
//! ## Retry behavior
//!
//! | Variant              | Retriable | Retried by                      |
//! |----------------------|-----------|---------------------------------|
//! | Service              | yes       | client transport loop, fixed delay |
//! | Extraction           | yes       | runner, by re-invoking the completion |
//! | Configuration        | no        | never                           |
//! | OversizedCodeRequest | no        | never                           |

use thiserror::Error;

/// Unified error type for the completion layer.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transport or service-side failure: connect/timeout errors, non-2xx
    /// status, or a response body missing the expected fields. The client
    /// retries these up to its attempt budget, then surfaces the last one.
    #[error("completion service failure: {0}")]
    Service(String),

    /// The service answered, but no code block or JSON object could be
    /// recovered from the text. The runner retries by requesting a fresh
    /// completion.
    #[error("could not extract {expected} from response: {reason}")]
    Extraction { expected: Expectation, reason: String },

    /// Caller-side problem (empty credential, empty model name). Fails
    /// immediately, never retried.
    #[error("completion configuration error: {0}")]
    Configuration(String),

    /// A code-generation request whose content spans more than one chunk.
    /// Code from multiple chunks cannot be merged, so the request is
    /// rejected up front instead of silently returning a truncated result.
    #[error("code generation content spans {chunks} chunks; code requests must fit one chunk")]
    OversizedCodeRequest { chunks: usize },
}

/// What the extractor was asked to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Code,
    Object,
}

impl std::fmt::Display for Expectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code => write!(f, "code"),
            Self::Object => write!(f, "a JSON object"),
        }
    }
}

impl CompletionError {
    /// Returns `true` if a caller may retry the operation that produced
    /// this error.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::Service(_) | Self::Extraction { .. })
    }

    /// Build a `Service` variant from anything displayable.
    pub fn service(message: impl std::fmt::Display) -> Self {
        Self::Service(message.to_string())
    }

    /// Build an `Extraction` variant for a missing JSON object.
    pub fn no_object(reason: impl Into<String>) -> Self {
        Self::Extraction {
            expected: Expectation::Object,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_failure_is_retriable() {
        let err = CompletionError::service("connection reset by peer");
        assert!(err.is_retriable());
    }

    #[test]
    fn test_extraction_failure_is_retriable() {
        let err = CompletionError::no_object("no braces in response");
        assert!(err.is_retriable());
    }

    #[test]
    fn test_configuration_is_terminal() {
        let err = CompletionError::Configuration("empty api key".into());
        assert!(!err.is_retriable());
    }

    #[test]
    fn test_oversized_code_request_is_terminal() {
        let err = CompletionError::OversizedCodeRequest { chunks: 4 };
        assert!(!err.is_retriable());
        assert!(err.to_string().contains("4 chunks"));
    }
}
