//! Pipeline sequencing, progress, and aggregation.
//!
//! Classification and synthesis failures abort the run. Everything
//! after the plan exists is per-file: a file that cannot be transformed
//! becomes an error placeholder and the run keeps going. Originals the
//! plan never mentioned ride along unchanged at the end.

use completion::{ApiKey, Completion};
use tracing::{info, warn};

use crate::config::MorphConfig;
use crate::error::MorphError;
use crate::manifest::{FileEntry, OutputFile, PlanAction, TransformPlan};
use crate::progress::{percent_complete, ProgressSink};
use crate::stages::{classify, plan as plan_stage, transform};

/// Reject empty language tags and pairs that differ only in case.
pub fn validate_language_pair(source: &str, target: &str) -> Result<(), MorphError> {
    let source_tag = source.trim();
    let target_tag = target.trim();
    if source_tag.is_empty() || target_tag.is_empty() {
        return Err(MorphError::unsupported(source, target));
    }
    if source_tag.eq_ignore_ascii_case(target_tag) {
        return Err(MorphError::unsupported(source, target));
    }
    Ok(())
}

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunOutcome {
    pub outputs: Vec<OutputFile>,
    pub plan: TransformPlan,
}

/// Run the staged pipeline over `files`, reporting progress after each
/// plan entry.
pub async fn run(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    files: &[FileEntry],
    source: &str,
    target: &str,
    progress: &mut dyn ProgressSink,
) -> Result<Vec<OutputFile>, MorphError> {
    let outcome = run_pipeline(completion, config, credentials, files, source, target, progress).await?;
    Ok(outcome.outputs)
}

/// [`run`] plus the synthesized plan, for callers that audit or persist it.
pub async fn run_pipeline(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    files: &[FileEntry],
    source: &str,
    target: &str,
    progress: &mut dyn ProgressSink,
) -> Result<RunOutcome, MorphError> {
    validate_language_pair(source, target)?;

    info!(files = files.len(), source, target, "Starting transformation run");
    let relevance =
        classify::classify(completion, config, credentials, files, source, target).await?;
    let plan =
        plan_stage::synthesize(completion, config, credentials, files, &relevance, source, target)
            .await?;

    let total = plan.len();
    let mut outputs = Vec::with_capacity(files.len().max(total));
    let mut processed = 0usize;

    for (path, entry) in plan.iter() {
        if entry.action.is_none() {
            warn!(path, "Plan entry has no action; passing the original through");
        }
        let output = match entry.effective_action() {
            PlanAction::Keep => keep_original(files, path),
            PlanAction::Morph => {
                match transform::transform_file(
                    completion,
                    config,
                    credentials,
                    path,
                    entry,
                    &plan,
                    target,
                )
                .await
                {
                    Ok(code) => {
                        info!(path, "Morphed file");
                        OutputFile::generated(path, code)
                    }
                    Err(err) => {
                        warn!(path, error = %err, "Per-file transformation failed; emitting placeholder");
                        OutputFile::placeholder(path, err)
                    }
                }
            }
        };
        outputs.push(output);
        processed += 1;
        progress.emit(percent_complete(processed, total));
    }

    // Unplanned originals are appended once, after all plan entries, and
    // are not progress-tracked.
    for entry in files {
        if !plan.contains(&entry.path) {
            outputs.push(OutputFile::kept(entry));
        }
    }

    info!(
        outputs = outputs.len(),
        placeholders = outputs.iter().filter(|o| o.is_error_placeholder()).count(),
        "Transformation run complete"
    );
    Ok(RunOutcome { outputs, plan })
}

fn keep_original(files: &[FileEntry], path: &str) -> OutputFile {
    match files.iter().find(|file| file.path == path) {
        Some(entry) => OutputFile::kept(entry),
        None => {
            warn!(path, "Plan kept a path with no matching original; emitting placeholder");
            OutputFile::placeholder(path, format!("no original file for planned path {path}"))
        }
    }
}
