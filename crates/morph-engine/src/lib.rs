//! Staged LLM Repository Transformation Library
//!
//! This library provides:
//! - Relevance classification over a file manifest in one batched call
//! - Plan synthesis mapping each output file to a morph/keep action
//! - A bounded generate-review-retry loop for per-file code generation
//! - An orchestrator that sequences the stages, reports progress, and
//!   degrades per-file failures into error placeholders
//!
//! Supporting stages cover per-file summaries, framework
//! identification, and single-file translation. All service traffic
//! goes through the [`completion`] crate's [`completion::Completion`]
//! seam; credentials are passed explicitly and never read from the
//! environment inside the library.

pub mod config;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod progress;
pub mod prompts;
pub mod stages;

// Re-export key configuration and error types
pub use config::MorphConfig;
pub use error::MorphError;

// Re-export key manifest types
pub use manifest::{
    load_manifest, save_manifest, FileAnalysis, FileEntry, FileKind, OutputFile, PlanAction,
    PlanEntry, TransformPlan,
};

// Re-export key pipeline entry points
pub use orchestrator::{run, run_pipeline, validate_language_pair, RunOutcome};

// Re-export key progress types
pub use progress::{percent_complete, LogSink, ProgressSink};

// Re-export key per-file transformation types
pub use stages::transform::{
    decide, ReviewResult, Transition, Verdict, GENERATE_TEMPERATURE, MAX_GENERATE_ATTEMPTS,
};
