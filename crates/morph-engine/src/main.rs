use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use completion::ApiKey;
use serde::Serialize;
use tracing::{info, warn};

use morph_engine::manifest::{load_manifest, save_manifest, FileKind, OutputFile};
use morph_engine::stages::{analyze, frameworks, translate};
use morph_engine::{orchestrator, LogSink, MorphConfig};

#[derive(Parser)]
#[command(
    name = "morph-engine",
    about = "Staged LLM transformation pipeline for file manifests",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fill missing per-file summaries and report framework candidates.
    Analyze {
        /// Manifest to analyze (JSON array of file entries).
        #[arg(long)]
        manifest: PathBuf,
        /// Where to write the analyzed manifest.
        #[arg(long)]
        out: PathBuf,
        /// Service credential; falls back to MORPH_API_KEY then OPENAI_API_KEY.
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Run the full transformation pipeline over a manifest.
    Morph {
        #[arg(long)]
        manifest: PathBuf,
        /// Source language of the input files.
        #[arg(long)]
        source: String,
        /// Target language to morph into.
        #[arg(long)]
        target: String,
        /// Directory the transformed tree is written into.
        #[arg(long)]
        out_dir: PathBuf,
        /// Also write the synthesized plan here.
        #[arg(long)]
        plan_out: Option<PathBuf>,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// Translate a single file between languages.
    Translate {
        /// File whose content should be translated.
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        source: String,
        #[arg(long)]
        target: String,
        /// Write here instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        api_key: Option<String>,
    },
}

#[derive(Serialize)]
struct RunReport {
    started_at: String,
    finished_at: String,
    source: String,
    target: String,
    input_files: usize,
    plan_entries: usize,
    outputs: usize,
    placeholders: usize,
    placeholder_paths: Vec<String>,
}

/// Credentials are resolved only here, at the binary edge.
fn resolve_api_key(flag: Option<String>) -> Result<ApiKey> {
    let raw = flag
        .or_else(|| env::var("MORPH_API_KEY").ok())
        .or_else(|| env::var("OPENAI_API_KEY").ok())
        .unwrap_or_default();
    let key = ApiKey::new(raw);
    if key.is_empty() {
        bail!("no API key: pass --api-key or set MORPH_API_KEY / OPENAI_API_KEY");
    }
    Ok(key)
}

/// Join an output path under `base`, rejecting anything that would
/// escape it (absolute paths, parent components).
fn safe_join(base: &Path, relative: &str) -> Option<PathBuf> {
    let mut joined = base.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    Some(joined)
}

fn write_outputs(out_dir: &Path, outputs: &[OutputFile]) -> Result<()> {
    for output in outputs {
        let Some(path) = safe_join(out_dir, &output.path) else {
            warn!(path = %output.path, "Skipping output that would escape the output directory");
            continue;
        };
        match output.kind {
            FileKind::Tree => {
                fs::create_dir_all(&path)
                    .with_context(|| format!("creating directory {}", path.display()))?;
            }
            FileKind::Blob => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("creating directory {}", parent.display()))?;
                }
                fs::write(&path, &output.content)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
    }
    Ok(())
}

async fn run_analyze(manifest: PathBuf, out: PathBuf, api_key: Option<String>) -> Result<()> {
    let credentials = resolve_api_key(api_key)?;
    let config = MorphConfig::default();
    let client = config.client().context("building completion client")?;

    let files = load_manifest(&manifest)?;
    let analyzed = analyze::analyze_manifest(&client, &config, &credentials, files).await;
    save_manifest(&out, &analyzed)?;
    info!(path = %out.display(), "Wrote analyzed manifest");

    match frameworks::identify(&client, &config, &credentials, &analyzed).await {
        Ok(map) => {
            for (framework, targets) in &map {
                info!(framework = %framework, candidates = %targets.join(", "), "Framework candidate");
            }
        }
        Err(err) => warn!(error = %err, "Framework identification failed"),
    }
    Ok(())
}

async fn run_morph(
    manifest: PathBuf,
    source: String,
    target: String,
    out_dir: PathBuf,
    plan_out: Option<PathBuf>,
    api_key: Option<String>,
) -> Result<()> {
    orchestrator::validate_language_pair(&source, &target)?;
    let credentials = resolve_api_key(api_key)?;
    let config = MorphConfig::default();
    let client = config.client().context("building completion client")?;

    let files = load_manifest(&manifest)?;
    let started_at = Utc::now();
    let mut progress = LogSink;
    let outcome = orchestrator::run_pipeline(
        &client,
        &config,
        &credentials,
        &files,
        &source,
        &target,
        &mut progress,
    )
    .await?;
    let finished_at = Utc::now();

    fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;
    write_outputs(&out_dir, &outcome.outputs)?;

    if let Some(plan_path) = plan_out {
        fs::write(&plan_path, outcome.plan.to_context_json())
            .with_context(|| format!("writing plan {}", plan_path.display()))?;
        info!(path = %plan_path.display(), "Wrote transformation plan");
    }

    let placeholder_paths: Vec<String> = outcome
        .outputs
        .iter()
        .filter(|output| output.is_error_placeholder())
        .map(|output| output.path.clone())
        .collect();
    let report = RunReport {
        started_at: started_at.to_rfc3339(),
        finished_at: finished_at.to_rfc3339(),
        source,
        target,
        input_files: files.len(),
        plan_entries: outcome.plan.len(),
        outputs: outcome.outputs.len(),
        placeholders: placeholder_paths.len(),
        placeholder_paths,
    };
    let report_path = out_dir.join("morph-report.json");
    let report_json = serde_json::to_string_pretty(&report).context("serializing run report")?;
    fs::write(&report_path, report_json)
        .with_context(|| format!("writing report {}", report_path.display()))?;
    info!(
        outputs = report.outputs,
        placeholders = report.placeholders,
        report = %report_path.display(),
        "Transformation run finished"
    );
    Ok(())
}

async fn run_translate(
    file: PathBuf,
    source: String,
    target: String,
    out: Option<PathBuf>,
    api_key: Option<String>,
) -> Result<()> {
    orchestrator::validate_language_pair(&source, &target)?;
    let credentials = resolve_api_key(api_key)?;
    let config = MorphConfig::default();
    let client = config.client().context("building completion client")?;

    let code =
        fs::read_to_string(&file).with_context(|| format!("reading {}", file.display()))?;
    let translated =
        translate::translate_code(&client, &config, &credentials, &code, &source, &target).await?;
    match out {
        Some(path) => {
            fs::write(&path, &translated)
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Wrote translation");
        }
        None => println!("{translated}"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Analyze {
            manifest,
            out,
            api_key,
        } => run_analyze(manifest, out, api_key).await,
        Command::Morph {
            manifest,
            source,
            target,
            out_dir,
            plan_out,
            api_key,
        } => run_morph(manifest, source, target, out_dir, plan_out, api_key).await,
        Command::Translate {
            file,
            source,
            target,
            out,
            api_key,
        } => run_translate(file, source, target, out, api_key).await,
    }
}
