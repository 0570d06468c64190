//! Human-readable pass reports.

use strum::{Display, EnumIter};

/// How a [`Summary`] should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Severity {
    /// Neutral information
    #[strum(serialize = "info")]
    Info,
    /// A transformation was applied
    #[strum(serialize = "success")]
    Success,
    /// Something was skipped or only partially handled
    #[strum(serialize = "warning")]
    Warning,
    /// The pass failed
    #[strum(serialize = "error")]
    Error,
}

/// One line of a pass report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// The text shown to the user
    pub message: String,
    /// How the message should be presented
    pub severity: Severity,
}

impl Summary {
    /// Creates a summary line
    #[must_use]
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Summary {
            message: message.into(),
            severity,
        }
    }

    /// A [`Severity::Success`] line
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Success)
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)
    }
}
