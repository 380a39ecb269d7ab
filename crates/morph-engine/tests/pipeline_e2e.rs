//! End-to-end pipeline tests: a scripted completion drives the full
//! classify → synthesize → transform flow.
//!
//! Verified here:
//! - per-file failures degrade to placeholders without aborting the run
//! - progress is emitted once per plan entry, monotone, ending at 100
//! - keep entries pass originals through; unplanned originals are
//!   appended once, in manifest order
//! - runs with an empty plan emit no progress at all

mod common;

use std::time::Duration;

use common::{blob, Outcome, Scripted};
use completion::ApiKey;
use morph_engine::error::MorphError;
use morph_engine::manifest::FileKind;
use morph_engine::orchestrator::run;
use morph_engine::MorphConfig;

fn config() -> MorphConfig {
    MorphConfig {
        base_url: "https://example.invalid/v1".to_string(),
        model: "gpt-4".to_string(),
        max_output_tokens: 4000,
        http_timeout: Duration::from_secs(5),
        chunk_units: 2700,
    }
}

fn key() -> ApiKey {
    ApiKey::new("sk-test")
}

const PASS: &str = r#"{"verdict": "Pass", "notes": "ok"}"#;
const FAIL: &str = r#"{"verdict": "Fail", "notes": "not idiomatic"}"#;

#[tokio::test]
async fn test_per_file_failure_degrades_to_a_placeholder() {
    // Three morph entries; the middle one fails review on all three
    // attempts while its neighbors succeed.
    let fake = Scripted::replies(&[
        r#"{"a.js": true, "b.js": true, "c.js": true}"#,
        r#"{
            "a.js": {"brief": "rewrite", "action": "morph"},
            "b.js": {"brief": "rewrite", "action": "morph"},
            "c.js": {"brief": "rewrite", "action": "morph"}
        }"#,
        "code a",
        PASS,
        "bad b",
        FAIL,
        "bad b again",
        FAIL,
        "bad b final",
        FAIL,
        "code c",
        PASS,
    ]);
    let files = vec![
        blob("a.js", "let a", "module a"),
        blob("b.js", "let b", "module b"),
        blob("c.js", "let c", "module c"),
    ];

    let mut percents = Vec::new();
    let mut sink = |p: u8| percents.push(p);
    let outputs = run(
        &fake,
        &config(),
        &key(),
        &files,
        "JavaScript",
        "Rust",
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(outputs.len(), 3);
    assert_eq!(outputs[0].content, "code a");
    assert!(outputs[1].is_error_placeholder());
    assert!(outputs[1].content.contains("b.js"));
    assert!(outputs[1].content.contains("3 attempts"));
    assert_eq!(outputs[2].content, "code c");
    assert_eq!(percents, vec![33, 67, 100]);
}

#[tokio::test]
async fn test_mixed_plan_reports_progress_and_appends_uncovered_originals() {
    // One morph, one keep; the morphed output lands under a new path, so
    // the original rides along at the end, untracked by progress.
    let fake = Scripted::replies(&[
        r#"{"app.js": true, "logo.png": false}"#,
        r#"{
            "app.rs": {"brief": "port the entry point", "action": "morph"},
            "logo.png": {"brief": "static asset", "action": "keep"}
        }"#,
        "fn main() {}",
        PASS,
    ]);
    let files = vec![
        blob("app.js", "function main() {}", "entry point"),
        blob("logo.png", "<binary>", "logo"),
    ];

    let mut percents = Vec::new();
    let mut sink = |p: u8| percents.push(p);
    let outputs = run(
        &fake,
        &config(),
        &key(),
        &files,
        "JavaScript",
        "Rust",
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(percents, vec![50, 100]);

    let paths: Vec<_> = outputs.iter().map(|o| o.path.as_str()).collect();
    assert_eq!(paths, vec!["app.rs", "logo.png", "app.js"]);
    assert_eq!(outputs[0].content, "fn main() {}");
    assert_eq!(outputs[1].content, "<binary>");
    // The appended original keeps its source content verbatim.
    assert_eq!(outputs[2].content, "function main() {}");
}

#[tokio::test]
async fn test_keeps_pass_originals_through_and_flag_missing_ones() {
    let fake = Scripted::replies(&[
        r#"{"kept.js": true}"#,
        r#"{
            "kept.js": {"action": "keep"},
            "ghost.js": {"action": "keep"}
        }"#,
    ]);
    let files = vec![blob("kept.js", "original text", "config")];

    let mut percents = Vec::new();
    let mut sink = |p: u8| percents.push(p);
    let outputs = run(
        &fake,
        &config(),
        &key(),
        &files,
        "JavaScript",
        "Rust",
        &mut sink,
    )
    .await
    .unwrap();

    // Keeps cost no generate or review calls.
    assert_eq!(fake.calls(), 2);
    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].content, "original text");
    assert_eq!(outputs[0].kind, FileKind::Blob);
    assert!(outputs[1].is_error_placeholder());
    assert!(outputs[1].content.contains("ghost.js"));
    assert_eq!(percents, vec![50, 100]);
}

#[tokio::test]
async fn test_entries_without_an_action_pass_the_original_through() {
    let fake = Scripted::replies(&[
        r#"{"kept.js": true}"#,
        r#"{"kept.js": {"brief": "unclear"}}"#,
    ]);
    let files = vec![blob("kept.js", "original text", "config")];

    let mut sink = |_: u8| {};
    let outputs = run(
        &fake,
        &config(),
        &key(),
        &files,
        "JavaScript",
        "Rust",
        &mut sink,
    )
    .await
    .unwrap();

    assert_eq!(fake.calls(), 2);
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].content, "original text");
    assert!(!outputs[0].is_error_placeholder());
}

#[tokio::test]
async fn test_empty_plan_emits_no_progress_and_appends_all_originals() {
    let fake = Scripted::replies(&[
        r#"{"a.md": false, "b.md": false, "c.md": false}"#,
        "{}",
    ]);
    let files = vec![
        blob("a.md", "alpha", "docs"),
        blob("b.md", "beta", "docs"),
        blob("c.md", "gamma", "docs"),
    ];

    let mut percents = Vec::new();
    let mut sink = |p: u8| percents.push(p);
    let outputs = run(
        &fake,
        &config(),
        &key(),
        &files,
        "JavaScript",
        "Rust",
        &mut sink,
    )
    .await
    .unwrap();

    assert!(percents.is_empty());
    let paths: Vec<_> = outputs.iter().map(|o| o.path.as_str()).collect();
    assert_eq!(paths, vec!["a.md", "b.md", "c.md"]);
    assert_eq!(outputs[0].content, "alpha");
}

#[tokio::test]
async fn test_identical_language_pairs_are_rejected_before_any_call() {
    let fake = Scripted::replies(&[]);
    let files = vec![blob("a.js", "let a", "module")];

    let mut sink = |_: u8| {};
    let err = run(&fake, &config(), &key(), &files, "Rust", "rust", &mut sink)
        .await
        .unwrap_err();

    assert!(matches!(err, MorphError::UnsupportedLanguage { .. }));
    assert_eq!(fake.calls(), 0);
}

#[tokio::test]
async fn test_classification_failure_aborts_the_run() {
    let fake = Scripted::new(vec![Outcome::Fail("upstream down")]);
    let files = vec![blob("a.js", "let a", "module")];

    let mut sink = |_: u8| {};
    let err = run(
        &fake,
        &config(),
        &key(),
        &files,
        "JavaScript",
        "Rust",
        &mut sink,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, MorphError::Classification { .. }));
    assert_eq!(fake.calls(), 1);
}
