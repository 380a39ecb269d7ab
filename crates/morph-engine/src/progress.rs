//! Progress reporting seam.
//!
//! The orchestrator reports an integer percentage after finishing each
//! plan entry. Sinks run synchronously on the pipeline's thread of
//! control and must return quickly or they stall the run.

use tracing::info;

/// Receives percentages 0..=100 as plan entries complete. The final
/// report of a non-empty plan is always exactly 100.
pub trait ProgressSink {
    fn emit(&mut self, percent: u8);
}

/// Closures work directly as sinks.
impl<F: FnMut(u8)> ProgressSink for F {
    fn emit(&mut self, percent: u8) {
        self(percent)
    }
}

/// Sink that reports through the structured log.
#[derive(Debug, Default)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn emit(&mut self, percent: u8) {
        info!(percent, "Transformation progress");
    }
}

/// Percentage after `processed` of `total` entries, rounded half away
/// from zero. A zero `total` reports 100; the pipeline never asks in
/// that case because an empty plan emits no progress at all.
pub fn percent_complete(processed: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((processed as f64 / total as f64) * 100.0).round() as u8
}
