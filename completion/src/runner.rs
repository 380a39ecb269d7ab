//! Drives one logical request across all chunks of a large input.
//!
//! Structured requests: every chunk is completed and extracted, and the
//! per-chunk objects are shallow-merged, later chunks overwriting earlier
//! keys. An extraction failure re-invokes the completion for a fresh
//! sample, up to [`MAX_EXTRACTION_ATTEMPTS`] times per chunk; this outer
//! loop is distinct from the transport retries inside the client.
//!
//! Code requests: must fit a single chunk. Code from multiple chunks
//! cannot be merged, so oversized content is rejected up front.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::chunk::{chunk, DEFAULT_CHUNK_UNITS};
use crate::client::{ApiKey, Completion, CompletionRequest};
use crate::error::CompletionError;
use crate::extract::{extract_code, extract_object};

/// Attempt budget for recovering a parsable object from one chunk.
pub const MAX_EXTRACTION_ATTEMPTS: u32 = 12;

/// Parameters for one chunked request.
#[derive(Debug, Clone)]
pub struct ChunkedRequest<'a> {
    pub model: &'a str,
    pub instructions: &'a str,
    pub content: &'a str,
    pub credentials: &'a ApiKey,
    pub temperature: Option<f32>,
    pub max_units: usize,
}

impl<'a> ChunkedRequest<'a> {
    pub fn new(
        model: &'a str,
        instructions: &'a str,
        content: &'a str,
        credentials: &'a ApiKey,
    ) -> Self {
        Self {
            model,
            instructions,
            content,
            credentials,
            temperature: None,
            max_units: DEFAULT_CHUNK_UNITS,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_units(mut self, max_units: usize) -> Self {
        self.max_units = max_units;
        self
    }

    fn completion_for<'b>(&'b self, chunk_text: &'b str) -> CompletionRequest<'b> {
        CompletionRequest {
            model: self.model,
            instructions: self.instructions,
            content: chunk_text,
            credentials: self.credentials,
            temperature: self.temperature,
        }
    }
}

/// Run a structured request over every chunk of the content and merge the
/// per-chunk objects, last write winning on key collision.
pub async fn run_object(
    completion: &dyn Completion,
    request: &ChunkedRequest<'_>,
) -> Result<Map<String, Value>, CompletionError> {
    let chunks = chunk(request.content, request.max_units);
    debug!(chunks = chunks.len(), model = request.model, "Dispatching structured request");

    let mut merged = Map::new();
    for chunk_text in &chunks {
        let part = object_from_chunk(completion, request, chunk_text).await?;
        for (key, value) in part {
            merged.insert(key, value);
        }
    }
    Ok(merged)
}

/// Run a code-generation request. The content must fit a single chunk.
pub async fn run_code(
    completion: &dyn Completion,
    request: &ChunkedRequest<'_>,
) -> Result<String, CompletionError> {
    let chunks = chunk(request.content, request.max_units);
    if chunks.len() > 1 {
        return Err(CompletionError::OversizedCodeRequest { chunks: chunks.len() });
    }

    let raw = completion.complete(request.completion_for(&chunks[0])).await?;
    Ok(extract_code(&raw))
}

async fn object_from_chunk(
    completion: &dyn Completion,
    request: &ChunkedRequest<'_>,
    chunk_text: &str,
) -> Result<Map<String, Value>, CompletionError> {
    let mut last_err = None;
    for attempt in 1..=MAX_EXTRACTION_ATTEMPTS {
        // Transport failures have already spent the client's own attempt
        // budget, so they propagate instead of consuming this loop.
        let raw = completion.complete(request.completion_for(chunk_text)).await?;
        match extract_object(&raw) {
            Ok(map) => return Ok(map),
            Err(err) => {
                warn!(
                    attempt,
                    max_attempts = MAX_EXTRACTION_ATTEMPTS,
                    error = %err,
                    "Extraction failed; requesting a fresh completion"
                );
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| CompletionError::no_object("extraction attempts exhausted")))
}
