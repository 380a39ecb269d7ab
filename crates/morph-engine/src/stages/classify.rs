//! Relevance classification.
//!
//! One batched call judges every file at once. The request body is a
//! line-per-file manifest of paths and briefs; the reply is a JSON
//! object mapping each path to a boolean.

use std::collections::HashMap;

use completion::{run_object, ApiKey, ChunkedRequest, Completion};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::MorphConfig;
use crate::error::MorphError;
use crate::manifest::FileEntry;
use crate::prompts;

/// Map from manifest path to the classifier's relevance verdict.
pub type RelevanceMap = HashMap<String, bool>;

/// One line per file: `path: brief`. Files without a usable brief get a
/// `No summary` placeholder so the classifier can still judge them by
/// path alone.
pub(crate) fn manifest_lines(files: &[FileEntry]) -> String {
    files
        .iter()
        .map(|file| {
            let brief = file
                .analysis
                .as_ref()
                .map(|analysis| analysis.brief.as_str())
                .filter(|brief| !brief.is_empty())
                .unwrap_or("No summary");
            format!("{}: {}", file.path, brief)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn as_relevance(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Some(true),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// Classify every manifest file with a single batched request.
pub async fn classify(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    files: &[FileEntry],
    source: &str,
    target: &str,
) -> Result<RelevanceMap, MorphError> {
    let instructions = prompts::classify_instructions(source, target);
    let content = manifest_lines(files);
    let request = ChunkedRequest::new(&config.model, &instructions, &content, credentials)
        .with_max_units(config.chunk_units);

    let response = run_object(completion, &request)
        .await
        .map_err(MorphError::classification)?;

    let mut relevance = RelevanceMap::with_capacity(response.len());
    for (path, value) in response {
        match as_relevance(&value) {
            Some(flag) => {
                relevance.insert(path, flag);
            }
            None => {
                warn!(path = %path, value = %value, "Non-boolean relevance verdict; treating as not relevant");
                relevance.insert(path, false);
            }
        }
    }
    info!(
        files = files.len(),
        relevant = relevance.values().filter(|flag| **flag).count(),
        "Classified manifest"
    );
    Ok(relevance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{FileAnalysis, FileKind};
    use serde_json::json;

    fn entry(path: &str, brief: Option<&str>) -> FileEntry {
        FileEntry {
            path: path.to_string(),
            kind: FileKind::Blob,
            content: None,
            analysis: brief.map(|brief| FileAnalysis {
                brief: brief.to_string(),
                ..FileAnalysis::default()
            }),
        }
    }

    #[test]
    fn test_manifest_lines_pair_each_path_with_its_brief() {
        let files = vec![
            entry("src/index.js", Some("HTTP entry point")),
            entry("src/util.js", Some("shared helpers")),
        ];
        assert_eq!(
            manifest_lines(&files),
            "src/index.js: HTTP entry point\nsrc/util.js: shared helpers"
        );
    }

    #[test]
    fn test_files_without_a_brief_get_the_placeholder() {
        let files = vec![entry("README.md", None), entry("empty.js", Some(""))];
        assert_eq!(
            manifest_lines(&files),
            "README.md: No summary\nempty.js: No summary"
        );
    }

    #[test]
    fn test_relevance_values_accept_boolean_ish_strings() {
        assert_eq!(as_relevance(&json!(true)), Some(true));
        assert_eq!(as_relevance(&json!("True")), Some(true));
        assert_eq!(as_relevance(&json!("FALSE")), Some(false));
        assert_eq!(as_relevance(&json!("yes")), None);
        assert_eq!(as_relevance(&json!(1)), None);
    }
}
