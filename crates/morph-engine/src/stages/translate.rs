//! Single-file code translation.
//!
//! A one-shot structured call: the reply must be a JSON object whose
//! `translated_code` key holds the translated source text.

use completion::{run_object, ApiKey, ChunkedRequest, Completion, CompletionError};
use serde_json::Value;
use tracing::info;

use crate::config::MorphConfig;
use crate::error::MorphError;
use crate::prompts;

/// Translate one file's code between languages.
pub async fn translate_code(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    code: &str,
    source: &str,
    target: &str,
) -> Result<String, MorphError> {
    let instructions = prompts::translate_instructions(source, target);
    let request = ChunkedRequest::new(&config.model, &instructions, code, credentials)
        .with_max_units(config.chunk_units);
    let object = run_object(completion, &request)
        .await
        .map_err(|err| MorphError::Translation { source: err })?;

    let translated = object
        .get("translated_code")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| MorphError::Translation {
            source: CompletionError::no_object("reply lacked a 'translated_code' string"),
        })?;
    info!(source, target, bytes = translated.len(), "Translated code");
    Ok(translated)
}
