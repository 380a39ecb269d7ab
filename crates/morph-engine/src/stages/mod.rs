//! Completion-backed pipeline stages.
//!
//! Each stage owns one prompt contract: it renders the request, issues
//! it through the shared [`completion::Completion`] seam, and decodes
//! the reply leniently. Sequencing lives in [`crate::orchestrator`].

pub mod analyze;
pub mod classify;
pub mod frameworks;
pub mod plan;
pub mod transform;
pub mod translate;
