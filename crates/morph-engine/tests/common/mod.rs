//! Shared scripted completion fake and manifest builders for the
//! integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use completion::{Completion, CompletionError, CompletionRequest};
use morph_engine::manifest::{FileAnalysis, FileEntry, FileKind};

/// One scripted turn of the fake service.
pub enum Outcome {
    Reply(&'static str),
    Fail(&'static str),
}

/// What one request to the fake looked like.
#[derive(Debug, Clone)]
pub struct Seen {
    pub model: String,
    pub instructions: String,
    pub content: String,
    pub temperature: Option<f32>,
}

/// Completion fake that plays back scripted outcomes in order and
/// records every request. A dry script means the test under-budgeted
/// its replies; that surfaces as a service error.
pub struct Scripted {
    script: Mutex<VecDeque<Outcome>>,
    seen: Mutex<Vec<Seen>>,
}

impl Scripted {
    pub fn new(outcomes: Vec<Outcome>) -> Self {
        Self {
            script: Mutex::new(outcomes.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(replies: &[&'static str]) -> Self {
        Self::new(replies.iter().copied().map(Outcome::Reply).collect())
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completion for Scripted {
    async fn complete(&self, request: CompletionRequest<'_>) -> Result<String, CompletionError> {
        self.seen.lock().unwrap().push(Seen {
            model: request.model.to_string(),
            instructions: request.instructions.to_string(),
            content: request.content.to_string(),
            temperature: request.temperature,
        });
        match self.script.lock().unwrap().pop_front() {
            Some(Outcome::Reply(text)) => Ok(text.to_string()),
            Some(Outcome::Fail(message)) => Err(CompletionError::service(message)),
            None => Err(CompletionError::service("script exhausted")),
        }
    }
}

/// A blob entry with content and a one-line brief.
pub fn blob(path: &str, content: &str, brief: &str) -> FileEntry {
    FileEntry {
        path: path.to_string(),
        kind: FileKind::Blob,
        content: Some(content.to_string()),
        analysis: Some(FileAnalysis {
            brief: brief.to_string(),
            ..FileAnalysis::default()
        }),
    }
}

/// A blob entry with no prior analysis.
pub fn raw_blob(path: &str, content: &str) -> FileEntry {
    FileEntry {
        path: path.to_string(),
        kind: FileKind::Blob,
        content: Some(content.to_string()),
        analysis: None,
    }
}

/// A directory entry.
pub fn tree(path: &str) -> FileEntry {
    FileEntry {
        path: path.to_string(),
        kind: FileKind::Tree,
        content: None,
        analysis: None,
    }
}
