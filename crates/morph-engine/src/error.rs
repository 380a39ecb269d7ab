//! Pipeline error taxonomy.
//!
//! Three behavioral classes:
//!
//! | Class        | Variants                                   | Effect            |
//! |--------------|--------------------------------------------|-------------------|
//! | caller input | UnsupportedLanguage, Configuration, Manifest | fail fast, no retry |
//! | run fatal    | Classification, Synthesis, FrameworkIdentification, Translation | abort the run |
//! | per file     | Generation, Review, TransformationFailed, Analysis | converted to a placeholder or skipped, run continues |

use std::path::Path;

use completion::CompletionError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MorphError {
    /// The requested source/target language pair cannot be transformed.
    #[error("unsupported language combination: {from} to {to}")]
    UnsupportedLanguage { from: String, to: String },

    /// Caller-side setup problem.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Manifest or output document could not be read, written, or parsed.
    #[error("manifest {path}: {message}")]
    Manifest { path: String, message: String },

    /// Stage 1 could not obtain a relevance map. No partial plan is usable,
    /// so this aborts the run.
    #[error("relevance classification failed: {source}")]
    Classification {
        #[source]
        source: CompletionError,
    },

    /// Stage 2 could not obtain a transformation plan. Aborts the run.
    #[error("plan synthesis failed: {source}")]
    Synthesis {
        #[source]
        source: CompletionError,
    },

    /// A generate call inside stage 3 failed terminally for one file.
    #[error("code generation for {path} failed: {source}")]
    Generation {
        path: String,
        #[source]
        source: CompletionError,
    },

    /// A review call inside stage 3 failed terminally for one file.
    #[error("review of {path} failed: {source}")]
    Review {
        path: String,
        #[source]
        source: CompletionError,
    },

    /// Stage 3 exhausted its generate attempts without a passing review.
    #[error("failed to generate satisfactory code for {path} after {attempts} attempts")]
    TransformationFailed { path: String, attempts: u32 },

    /// A per-file summary could not be generated. The file stays
    /// unanalyzed; the batch continues.
    #[error("analysis of {path} failed: {source}")]
    Analysis {
        path: String,
        #[source]
        source: CompletionError,
    },

    /// Framework identification over the whole manifest failed.
    #[error("framework identification failed: {source}")]
    FrameworkIdentification {
        #[source]
        source: CompletionError,
    },

    /// Single-file translation failed.
    #[error("translation failed: {source}")]
    Translation {
        #[source]
        source: CompletionError,
    },
}

impl MorphError {
    pub fn unsupported(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::UnsupportedLanguage { from: from.into(), to: to.into() }
    }

    pub fn manifest(path: &Path, message: impl std::fmt::Display) -> Self {
        Self::Manifest {
            path: path.display().to_string(),
            message: message.to_string(),
        }
    }

    pub fn classification(source: CompletionError) -> Self {
        Self::Classification { source }
    }

    pub fn synthesis(source: CompletionError) -> Self {
        Self::Synthesis { source }
    }

    pub fn generation(path: impl Into<String>, source: CompletionError) -> Self {
        Self::Generation { path: path.into(), source }
    }

    pub fn review(path: impl Into<String>, source: CompletionError) -> Self {
        Self::Review { path: path.into(), source }
    }

    pub fn analysis(path: impl Into<String>, source: CompletionError) -> Self {
        Self::Analysis { path: path.into(), source }
    }

    /// True for errors the orchestrator converts into a per-file error
    /// placeholder instead of aborting the run.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::Generation { .. }
                | Self::Review { .. }
                | Self::TransformationFailed { .. }
                | Self::Analysis { .. }
        )
    }
}
