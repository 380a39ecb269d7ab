//! Per-file summary generation.
//!
//! Summaries feed the classifier and synthesizer. A failed summary is
//! never fatal: the file stays unanalyzed and later stages fall back to
//! their `No summary` handling.

use completion::{run_object, ApiKey, ChunkedRequest, Completion};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::config::MorphConfig;
use crate::error::MorphError;
use crate::manifest::{FileAnalysis, FileEntry};
use crate::prompts;

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Summarize one file's content into the four analysis fields.
pub async fn summarize_file(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    path: &str,
    content: &str,
) -> Result<FileAnalysis, MorphError> {
    let instructions = prompts::analyze_instructions(path);
    let request = ChunkedRequest::new(&config.model, &instructions, content, credentials)
        .with_max_units(config.chunk_units);
    let object = run_object(completion, &request)
        .await
        .map_err(|err| MorphError::analysis(path, err))?;

    Ok(FileAnalysis {
        brief: text_field(&object, "brief"),
        dependencies: text_field(&object, "dependencies"),
        flow: text_field(&object, "flow"),
        contribution: text_field(&object, "contribution"),
    })
}

/// Fill missing analyses across a manifest. Only blobs with content are
/// summarized; failures leave the entry unanalyzed and the batch
/// continues.
pub async fn analyze_manifest(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    files: Vec<FileEntry>,
) -> Vec<FileEntry> {
    let mut analyzed = 0usize;
    let mut out = Vec::with_capacity(files.len());
    for mut entry in files {
        if entry.is_blob() && entry.analysis.is_none() {
            if let Some(content) = entry.content.clone() {
                match summarize_file(completion, config, credentials, &entry.path, &content).await {
                    Ok(analysis) => {
                        entry.analysis = Some(analysis);
                        analyzed += 1;
                    }
                    Err(err) => {
                        warn!(path = %entry.path, error = %err, "Summary generation failed; leaving file unanalyzed");
                    }
                }
            }
        }
        out.push(entry);
    }
    info!(analyzed, total = out.len(), "Analyzed manifest");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_fields_stringify_non_string_values() {
        let object = match json!({
            "brief": "entry point",
            "dependencies": ["express", "lodash"],
            "flow": 7
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(text_field(&object, "brief"), "entry point");
        assert_eq!(text_field(&object, "dependencies"), r#"["express","lodash"]"#);
        assert_eq!(text_field(&object, "flow"), "7");
        assert_eq!(text_field(&object, "contribution"), "");
    }
}
