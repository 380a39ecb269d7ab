//! Data model for file manifests, transformation plans, and outputs.
//!
//! The manifest document is a JSON array of [`FileEntry`]. Field aliases
//! accept the older wire names (`type`, `summary`,
//! `original_flow_covered`) so manifests exported from the previous
//! service load unchanged.

use std::collections::HashSet;
use std::path::Path;

use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::MorphError;

/// Kind of tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Blob,
    Tree,
}

/// Prior structured summary of one file, supplied by the collaborator or
/// produced by the analyze stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    #[serde(default)]
    pub brief: String,
    #[serde(default)]
    pub dependencies: String,
    #[serde(default)]
    pub flow: String,
    #[serde(default)]
    pub contribution: String,
}

/// One file as supplied by the file-source collaborator. Immutable once
/// read; the pipeline only ever produces new entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    #[serde(alias = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, alias = "summary", skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FileAnalysis>,
}

impl FileEntry {
    pub fn is_blob(&self) -> bool {
        self.kind == FileKind::Blob
    }
}

/// Terminal action assigned to a planned file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    /// Transform the file through the generate/review loop.
    Morph,
    /// Pass the original file through unchanged.
    Keep,
}

/// Per-file transformation instruction record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanEntry {
    #[serde(default)]
    pub brief: String,
    #[serde(default, alias = "original_flow_covered")]
    pub flow_covered: String,
    #[serde(default)]
    pub dependencies: String,
    #[serde(
        default,
        deserialize_with = "lenient_action",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<PlanAction>,
}

impl PlanEntry {
    /// Effective action for the orchestrator. Absent or unrecognized
    /// actions fall open to `Keep`; the caller is responsible for logging
    /// the omission.
    pub fn effective_action(&self) -> PlanAction {
        self.action.unwrap_or(PlanAction::Keep)
    }
}

/// The service is instructed to emit `"morph"` or `"keep"`, but anything
/// can come back. Unrecognized strings decode to `None` instead of
/// failing the whole plan.
fn lenient_action<'de, D>(deserializer: D) -> Result<Option<PlanAction>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.trim().to_ascii_lowercase().as_str() {
        "morph" => Some(PlanAction::Morph),
        "keep" => Some(PlanAction::Keep),
        _ => None,
    }))
}

/// Ordered transformation plan: path → entry, in the synthesizer's wire
/// key order. Order matters; the orchestrator iterates and reports
/// progress in exactly this sequence.
#[derive(Debug, Clone, Default)]
pub struct TransformPlan {
    entries: Vec<(String, PlanEntry)>,
}

impl TransformPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append or replace the entry for `path`, preserving first-seen order.
    pub fn insert(&mut self, path: impl Into<String>, entry: PlanEntry) {
        let path = path.into();
        match self.entries.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => *existing = entry,
            None => self.entries.push((path, entry)),
        }
    }

    pub fn get(&self, path: &str) -> Option<&PlanEntry> {
        self.entries.iter().find(|(p, _)| p == path).map(|(_, e)| e)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlanEntry)> {
        self.entries.iter().map(|(p, e)| (p.as_str(), e))
    }

    /// Pretty-printed JSON of the whole plan, used as shared context in
    /// generate and review instructions.
    pub fn to_context_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".into())
    }
}

impl Serialize for TransformPlan {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, entry) in &self.entries {
            map.serialize_entry(path, entry)?;
        }
        map.end()
    }
}

/// One entry of the final output list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    pub path: String,
    pub kind: FileKind,
    pub content: String,
}

impl OutputFile {
    /// Freshly generated code for a morphed file.
    pub fn generated(path: impl Into<String>, content: String) -> Self {
        Self { path: path.into(), kind: FileKind::Blob, content }
    }

    /// The original file passed through unchanged.
    pub fn kept(entry: &FileEntry) -> Self {
        Self {
            path: entry.path.clone(),
            kind: entry.kind,
            content: entry.content.clone().unwrap_or_default(),
        }
    }

    /// Sentinel payload recording a per-file failure in place of content.
    pub fn placeholder(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self {
            path: path.into(),
            kind: FileKind::Blob,
            content: format!("Error: {message}"),
        }
    }

    pub fn is_error_placeholder(&self) -> bool {
        self.content.starts_with("Error: ")
    }
}

/// Read a manifest document (JSON array of [`FileEntry`]) from disk and
/// reject duplicate paths.
pub fn load_manifest(path: &Path) -> Result<Vec<FileEntry>, MorphError> {
    let raw = std::fs::read_to_string(path).map_err(|e| MorphError::manifest(path, e))?;
    let entries: Vec<FileEntry> =
        serde_json::from_str(&raw).map_err(|e| MorphError::manifest(path, e))?;

    let mut seen = HashSet::new();
    for entry in &entries {
        if !seen.insert(entry.path.as_str()) {
            return Err(MorphError::manifest(
                path,
                format!("duplicate path {:?}", entry.path),
            ));
        }
    }

    debug!(path = %path.display(), files = entries.len(), "Loaded manifest");
    Ok(entries)
}

/// Write a manifest document to disk, pretty-printed.
pub fn save_manifest(path: &Path, entries: &[FileEntry]) -> Result<(), MorphError> {
    let raw =
        serde_json::to_string_pretty(entries).map_err(|e| MorphError::manifest(path, e))?;
    std::fs::write(path, raw).map_err(|e| MorphError::manifest(path, e))?;
    Ok(())
}
