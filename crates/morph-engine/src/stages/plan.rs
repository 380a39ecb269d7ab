//! Plan synthesis.
//!
//! Takes the files the classifier marked relevant and asks for one plan
//! entry per output file. Entries the service returns malformed fall
//! back to a default (keep) entry rather than failing the run; the
//! orchestrator flags entries with no explicit action.

use completion::{run_object, ApiKey, ChunkedRequest, Completion};
use tracing::{info, warn};

use crate::config::MorphConfig;
use crate::error::MorphError;
use crate::manifest::{FileEntry, PlanEntry, TransformPlan};
use crate::prompts;
use crate::stages::classify::RelevanceMap;

/// Render the relevant files' prior analysis as the synthesis request
/// body. Missing analysis fields get explicit placeholders so the
/// service never sees a dangling label.
pub(crate) fn relevant_block(files: &[FileEntry], relevance: &RelevanceMap) -> String {
    files
        .iter()
        .filter(|file| relevance.get(file.path.as_str()).copied().unwrap_or(false))
        .map(|file| {
            let analysis = file.analysis.clone().unwrap_or_default();
            let dependencies = or_placeholder(&analysis.dependencies, "None");
            let flow = or_placeholder(&analysis.flow, "Not specified");
            let contribution = or_placeholder(&analysis.contribution, "Not specified");
            format!(
                "{}:\n  Dependencies: {}\n  Flow: {}\n  Contribution: {}\n",
                file.path, dependencies, flow, contribution
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    if text.is_empty() {
        placeholder
    } else {
        text
    }
}

/// Synthesize the transformation plan for the relevant files.
pub async fn synthesize(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    files: &[FileEntry],
    relevance: &RelevanceMap,
    source: &str,
    target: &str,
) -> Result<TransformPlan, MorphError> {
    let instructions = prompts::synthesize_instructions(source, target);
    let content = relevant_block(files, relevance);
    let request = ChunkedRequest::new(&config.model, &instructions, &content, credentials)
        .with_max_units(config.chunk_units);

    let response = run_object(completion, &request)
        .await
        .map_err(MorphError::synthesis)?;

    let mut plan = TransformPlan::new();
    for (path, value) in response {
        let entry = match serde_json::from_value::<PlanEntry>(value) {
            Ok(entry) => entry,
            Err(err) => {
                warn!(path = %path, error = %err, "Malformed plan entry; keeping the file unchanged");
                PlanEntry::default()
            }
        };
        plan.insert(path, entry);
    }
    info!(entries = plan.len(), "Synthesized transformation plan");
    Ok(plan)
}
