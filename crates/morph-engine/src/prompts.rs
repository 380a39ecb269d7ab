//! Instruction templates for every completion-backed stage.
//!
//! Versioning: bump `PROMPT_VERSION` whenever template content changes,
//! so a logged run can be traced to the prompt text that produced it.
//! The JSON-contract sentences are load-bearing: the extractors and the
//! lenient parsers downstream expect exactly these key names.

/// Prompt version. Bump on any template content change.
pub const PROMPT_VERSION: &str = "1.0.0";

/// Stage 1: relevance classification over the whole manifest.
pub fn classify_instructions(source: &str, target: &str) -> String {
    format!(
        "You are planning a repository transformation from {source} to {target}.\n\
         Given the file manifest below, one `path: brief` line per file, identify which files \
         are relevant for the transformation.\n\
         Return a JSON object where keys are the file paths and values are booleans \
         (true if relevant, false if not). Return only the JSON object, with no text \
         before or after it."
    )
}

/// Stage 2: plan synthesis over the relevant files.
pub fn synthesize_instructions(source: &str, target: &str) -> String {
    format!(
        "You are planning a repository transformation from {source} to {target}.\n\
         The files below are the ones relevant to the transformation. Create the transformed \
         file structure. For each file provide a summary containing 'brief', \
         'original_flow_covered' (in natural language), 'dependencies', and set 'action' to \
         'morph', without any reference to the original file structure. Preserve the original \
         flow and business logic.\n\
         Return the result as a JSON object where keys are file paths and values are the \
         summary objects. Return only the JSON object, with no text before or after it."
    )
}

/// Stage 3, generate side. The full plan rides along as shared context so
/// cross-file references stay consistent.
pub fn generate_instructions(plan_context: &str) -> String {
    format!(
        "You are a senior developer fluent in every mainstream language and framework. \
         Provide only the code in your response, with no text before or after it. Fill every \
         placeholder comment with real code; leave none behind.\n\n\
         Shared transformed-structure context:\n{plan_context}"
    )
}

pub fn generate_content(path: &str, entry_json: &str, target: &str) -> String {
    format!(
        "Write the code for file path '{path}' in {target}, based on the following plan \
         entry and the shared structure:\n{entry_json}"
    )
}

/// Stage 3, review side.
pub fn review_instructions(plan_context: &str) -> String {
    format!(
        "You are a senior tech lead reviewing generated code. Respond with a JSON object \
         with keys:\n\
         - 'verdict': 'Pass' if the code satisfies its plan, 'Fail' otherwise\n\
         - 'notes': your comments on code quality and adherence to the original flow and \
         business logic\n\
         Return only the JSON object, with no text before or after it.\n\n\
         Shared transformed-structure context:\n{plan_context}"
    )
}

pub fn review_content(path: &str, code: &str, entry_json: &str, target: &str) -> String {
    format!(
        "Review the following {target} code for '{path}' against its plan entry.\n\
         Plan entry: {entry_json}\n\n\
         Code to review:\n{code}"
    )
}

/// Per-file summary generation.
pub fn analyze_instructions(file_name: &str) -> String {
    format!(
        "Analyze the file named \"{file_name}\" and summarize it:\n\
         1. a one-sentence brief of the file's purpose\n\
         2. any dependencies used in the file\n\
         3. the original flow of the file\n\
         4. how the file contributes to the app as a whole, technically and logically\n\
         Respond with a JSON object with exactly the keys brief, dependencies, flow, and \
         contribution, and no text before or after it.\n\n\
         File content (or one chunk of it) follows."
    )
}

/// Framework identification, first pass.
pub const FRAMEWORKS_IDENTIFY_INSTRUCTIONS: &str = "\
Given the following file structure and per-file summaries of a repository:

1. Identify the main programming frameworks used in this repository. These are the source \
frameworks.
2. For each identified framework, suggest relevant target frameworks that a translation \
could reasonably preserve the original flow and business logic in, excluding frameworks \
already present in the source.

Respond with a valid JSON object where keys are the unique source languages/frameworks and \
values are arrays of possible target languages/frameworks. Only these keys and values, with \
no text before or after the JSON object.

File structure and summaries:";

/// Framework identification, refinement pass.
pub const FRAMEWORKS_REFINE_INSTRUCTIONS: &str = "\
You are a tech lead who specializes in matching source technologies to target \
languages/frameworks.

Respond with a valid JSON object where keys are the unique source languages/frameworks and \
values are arrays of possible target languages/frameworks. Only these keys and values, with \
no text before or after the JSON object.";

pub fn frameworks_refine_content(initial_json: &str) -> String {
    format!(
        "The input below maps source languages/frameworks to candidate target frameworks \
         identified for a repository. Merge keys that name the same source technology under \
         different or combined names, unioning their candidate lists, so every remaining key \
         is a unique source technology. Keep at most 5 keys, preferring the most prominent \
         source technologies, and discard the rest.\n\
         Input:\n{initial_json}"
    )
}

/// Single-file translation.
pub fn translate_instructions(source: &str, target: &str) -> String {
    format!(
        "Translate the following {source} code to {target}. Respond with a JSON object with \
         a single key 'translated_code' containing the translated code, and no text before \
         or after it."
    )
}
