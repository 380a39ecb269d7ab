//! Framework identification over an analyzed manifest.
//!
//! Two passes: a low-temperature identification over every file's
//! analysis, then a zero-temperature refinement that merges redundant
//! keys and caps the result. The refined map pairs each source
//! technology with its suggested target-side replacements.

use completion::{run_object, ApiKey, ChunkedRequest, Completion};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::MorphConfig;
use crate::error::MorphError;
use crate::manifest::FileEntry;
use crate::prompts;

pub const IDENTIFY_TEMPERATURE: f32 = 0.1;
pub const REFINE_TEMPERATURE: f32 = 0.0;
/// The refinement pass promises at most this many source technologies;
/// anything extra is dropped in wire order.
pub const MAX_SOURCE_FRAMEWORKS: usize = 5;

/// Source technology paired with candidate replacements, in wire order.
pub type FrameworkMap = Vec<(String, Vec<String>)>;

/// One line per analyzed blob: `path: {analysis json}`.
pub(crate) fn summaries_block(files: &[FileEntry]) -> String {
    files
        .iter()
        .filter(|file| file.is_blob())
        .filter_map(|file| {
            let analysis = file.analysis.as_ref()?;
            let json = serde_json::to_string(analysis).ok()?;
            Some(format!("{}: {}", file.path, json))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn targets_of(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text),
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(text) => vec![text],
        other => vec![other.to_string()],
    }
}

/// Identify the manifest's frameworks and refine them into a capped map.
pub async fn identify(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    files: &[FileEntry],
) -> Result<FrameworkMap, MorphError> {
    let content = summaries_block(files);
    let identify_request = ChunkedRequest::new(
        &config.model,
        prompts::FRAMEWORKS_IDENTIFY_INSTRUCTIONS,
        &content,
        credentials,
    )
    .with_temperature(IDENTIFY_TEMPERATURE)
    .with_max_units(config.chunk_units);
    let initial = run_object(completion, &identify_request)
        .await
        .map_err(|err| MorphError::FrameworkIdentification { source: err })?;

    let initial_json =
        serde_json::to_string_pretty(&Value::Object(initial)).unwrap_or_else(|_| "{}".to_string());
    let refine_body = prompts::frameworks_refine_content(&initial_json);
    let refine_request = ChunkedRequest::new(
        &config.model,
        prompts::FRAMEWORKS_REFINE_INSTRUCTIONS,
        &refine_body,
        credentials,
    )
    .with_temperature(REFINE_TEMPERATURE)
    .with_max_units(config.chunk_units);
    let refined = run_object(completion, &refine_request)
        .await
        .map_err(|err| MorphError::FrameworkIdentification { source: err })?;

    let mut map = FrameworkMap::new();
    for (framework, value) in refined {
        if map.len() == MAX_SOURCE_FRAMEWORKS {
            warn!(dropped = %framework, "Refined framework map exceeds the cap; dropping the rest");
            break;
        }
        map.push((framework, targets_of(value)));
    }
    info!(frameworks = map.len(), "Identified frameworks");
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{FileAnalysis, FileKind};
    use serde_json::json;

    #[test]
    fn test_summaries_block_skips_trees_and_unanalyzed_files() {
        let files = vec![
            FileEntry {
                path: "src".to_string(),
                kind: FileKind::Tree,
                content: None,
                analysis: Some(FileAnalysis::default()),
            },
            FileEntry {
                path: "src/app.js".to_string(),
                kind: FileKind::Blob,
                content: None,
                analysis: Some(FileAnalysis {
                    brief: "entry".to_string(),
                    ..FileAnalysis::default()
                }),
            },
            FileEntry {
                path: "src/raw.js".to_string(),
                kind: FileKind::Blob,
                content: None,
                analysis: None,
            },
        ];
        let block = summaries_block(&files);
        assert!(block.starts_with("src/app.js: {"));
        assert!(!block.contains("src/raw.js"));
        assert_eq!(block.lines().count(), 1);
    }

    #[test]
    fn test_target_lists_accept_arrays_and_bare_strings() {
        assert_eq!(
            targets_of(json!(["actix-web", "axum"])),
            vec!["actix-web".to_string(), "axum".to_string()]
        );
        assert_eq!(targets_of(json!("tokio")), vec!["tokio".to_string()]);
    }
}
