//! Chunked, retrying completion client.
//!
//! This crate owns everything between "here is an instruction and a large
//! blob of content" and "here is the code or JSON object the service
//! produced":
//!
//! - `chunk`: whitespace-boundary splitting so requests stay under the
//!   service's context ceiling
//! - `client`: the chat-completions HTTP transport with a bounded,
//!   fixed-delay retry loop, behind the [`Completion`] trait seam
//! - `extract`: fenced-code and two-tier JSON recovery from raw replies
//! - `runner`: the per-chunk complete→extract loop with shallow merge for
//!   structured output and single-chunk enforcement for code output

pub mod chunk;
pub mod client;
pub mod error;
pub mod extract;
pub mod runner;

pub use chunk::{chunk, DEFAULT_CHUNK_UNITS};
pub use client::{
    ApiKey, Completion, CompletionRequest, HttpCompletionClient, DEFAULT_MAX_OUTPUT_TOKENS,
    MAX_ATTEMPTS, RETRY_DELAY,
};
pub use error::{CompletionError, Expectation};
pub use extract::{extract_code, extract_object};
pub use runner::{run_code, run_object, ChunkedRequest, MAX_EXTRACTION_ATTEMPTS};
