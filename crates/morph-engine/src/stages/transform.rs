//! The generate / review / retry loop for a single planned file.
//!
//! Each generate attempt is an independent sample: review notes are
//! logged for operators but never fed back into the next prompt. The
//! post-review step is a pure transition function so the attempt
//! accounting can be tested without a service.

use completion::{run_code, run_object, ApiKey, ChunkedRequest, Completion};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::MorphConfig;
use crate::error::MorphError;
use crate::manifest::{PlanEntry, TransformPlan};
use crate::prompts;

/// Generate attempts allowed per file.
pub const MAX_GENERATE_ATTEMPTS: u32 = 3;
/// Sampling temperature for generate calls. Review calls use the
/// service default.
pub const GENERATE_TEMPERATURE: f32 = 0.3;

/// Reviewer's judgement of one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

/// Decoded review reply, carried as a plain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewResult {
    pub verdict: Verdict,
    pub notes: String,
}

impl ReviewResult {
    /// Lenient decode of the reviewer's JSON object. `verdict` is the
    /// current wire name and `result` the older one; both are matched
    /// case-insensitively. Anything unrecognized is a Fail so a
    /// confused reviewer can never wave a candidate through.
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let verdict = object
            .get("verdict")
            .or_else(|| object.get("result"))
            .and_then(Value::as_str);
        let notes = object
            .get("notes")
            .or_else(|| object.get("review_notes"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        match verdict {
            Some(text) if text.trim().eq_ignore_ascii_case("pass") => Self {
                verdict: Verdict::Pass,
                notes,
            },
            Some(text) if text.trim().eq_ignore_ascii_case("fail") => Self {
                verdict: Verdict::Fail,
                notes,
            },
            _ => {
                let notes = if notes.is_empty() {
                    format!("unrecognized review reply: {}", Value::Object(object.clone()))
                } else {
                    notes
                };
                Self {
                    verdict: Verdict::Fail,
                    notes,
                }
            }
        }
    }

    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

/// What to do after reviewing attempt number `attempt` (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Accept,
    Retry,
    GiveUp,
}

pub fn decide(verdict: Verdict, attempt: u32, budget: u32) -> Transition {
    match verdict {
        Verdict::Pass => Transition::Accept,
        Verdict::Fail if attempt < budget => Transition::Retry,
        Verdict::Fail => Transition::GiveUp,
    }
}

/// Generate reviewed code for one planned file.
///
/// Returns the accepted candidate, or [`MorphError::TransformationFailed`]
/// once the attempt budget is spent. Transport and extraction failures
/// surface as [`MorphError::Generation`] / [`MorphError::Review`]; the
/// orchestrator treats all three as per-file failures.
pub async fn transform_file(
    completion: &dyn Completion,
    config: &MorphConfig,
    credentials: &ApiKey,
    path: &str,
    entry: &PlanEntry,
    plan: &TransformPlan,
    target: &str,
) -> Result<String, MorphError> {
    let plan_context = plan.to_context_json();
    let entry_json = serde_json::to_string(entry).unwrap_or_else(|_| "{}".to_string());
    let generate_instructions = prompts::generate_instructions(&plan_context);
    let review_instructions = prompts::review_instructions(&plan_context);

    for attempt in 1..=MAX_GENERATE_ATTEMPTS {
        debug!(path, attempt, "Generating candidate");
        let generate_body = prompts::generate_content(path, &entry_json, target);
        let generate_request =
            ChunkedRequest::new(&config.model, &generate_instructions, &generate_body, credentials)
                .with_temperature(GENERATE_TEMPERATURE)
                .with_max_units(config.chunk_units);
        let code = run_code(completion, &generate_request)
            .await
            .map_err(|err| MorphError::generation(path, err))?;

        let review_body = prompts::review_content(path, &code, &entry_json, target);
        let review_request =
            ChunkedRequest::new(&config.model, &review_instructions, &review_body, credentials)
                .with_max_units(config.chunk_units);
        let review_object = run_object(completion, &review_request)
            .await
            .map_err(|err| MorphError::review(path, err))?;
        let review = ReviewResult::from_object(&review_object);

        match decide(review.verdict, attempt, MAX_GENERATE_ATTEMPTS) {
            Transition::Accept => {
                info!(path, attempt, "Review passed");
                return Ok(code);
            }
            Transition::Retry => {
                warn!(path, attempt, notes = %review.notes, "Review failed; regenerating");
            }
            Transition::GiveUp => {
                warn!(path, attempts = attempt, notes = %review.notes, "Attempt budget exhausted");
                return Err(MorphError::TransformationFailed {
                    path: path.to_string(),
                    attempts: MAX_GENERATE_ATTEMPTS,
                });
            }
        }
    }

    // The final iteration always returns through Accept or GiveUp.
    Err(MorphError::TransformationFailed {
        path: path.to_string(),
        attempts: MAX_GENERATE_ATTEMPTS,
    })
}
