//! Deobfuscation result types.
//!
//! This module contains the [`DeobfuscationResult`] struct which encapsulates
//! the outcome of running the deobfuscation engine on a module.

use std::time::Duration;

use crate::deobfuscation::{
    events::{EventKind, EventLog},
    summary::Summary,
};

/// Result of running deobfuscation.
///
/// Contains the event log capturing all activity during deobfuscation, the
/// summary lines reported by each pass and the change total the passes counted.
/// The change total does not depend on which events a pass chose to record.
///
/// # Example
///
/// ```rust
/// use unhoist::deobfuscation::{DeobfuscationEngine, EngineConfig};
/// use unhoist::metadata::module::Module;
///
/// let mut module = Module::new("sample.dll");
/// let mut engine = DeobfuscationEngine::new(EngineConfig::default());
/// let result = engine.run(&mut module)?;
///
/// assert!(result.summaries.is_empty());
/// println!("{}", result.summary());
/// # Ok::<(), unhoist::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DeobfuscationResult {
    /// All events from the deobfuscation run.
    pub events: EventLog,
    /// Summary lines of every pass, in pass order.
    pub summaries: Vec<Summary>,
    /// Changes counted by all passes.
    pub changes: usize,
    /// Number of passes that ran.
    pub passes: usize,
    /// Total processing time.
    pub total_time: Duration,
}

impl DeobfuscationResult {
    /// Creates a new deobfuscation result.
    #[must_use]
    pub fn new(events: EventLog, summaries: Vec<Summary>) -> Self {
        Self {
            events,
            summaries,
            changes: 0,
            passes: 0,
            total_time: Duration::ZERO,
        }
    }

    /// Sets the change total counted by the passes.
    #[must_use]
    pub fn with_changes(mut self, changes: usize) -> Self {
        self.changes = changes;
        self
    }

    /// Sets timing and pass count.
    #[must_use]
    pub fn with_timing(mut self, time: Duration, passes: usize) -> Self {
        self.total_time = time;
        self.passes = passes;
        self
    }

    /// Number of field accesses the passes converted.
    #[must_use]
    pub fn accesses_rewritten(&self) -> usize {
        self.changes
    }

    /// Number of declarations removed from the module.
    #[must_use]
    pub fn artifacts_removed(&self) -> usize {
        self.events.count_kind(EventKind::ArtifactRemoved)
    }

    /// Generates a human-readable summary of the deobfuscation results.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} ({} passes, {:.2?})",
            self.events.summary(),
            self.passes,
            self.total_time
        )
    }

    /// Generates a detailed multi-line summary including every pass report.
    #[must_use]
    pub fn detailed_summary(&self) -> String {
        let mut out = format!("Deobfuscation complete: {}", self.summary());
        for summary in &self.summaries {
            out.push('\n');
            out.push_str(&summary.to_string());
        }
        out
    }
}
