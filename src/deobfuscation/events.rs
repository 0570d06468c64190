//! Event logging for deobfuscation passes.
//!
//! Passes record what they detected and changed into an [`EventLog`]. Events can
//! be inspected for debugging and reporting, or ignored.
//!
//! # Architecture
//!
//! - [`Event`] - A single recorded event (change, warning, info, etc.)
//! - [`EventLog`] - Collection of events with query and summary capabilities
//! - [`EventBuilder`] - Fluent API for creating events
//!
//! # Example
//!
//! ```rust
//! use unhoist::deobfuscation::{EventKind, EventLog};
//! use unhoist::metadata::token::Token;
//!
//! let log = EventLog::new();
//! log.record(EventKind::AccessRewritten)
//!     .at(Token::new(0x0600_0001), 3)
//!     .message("ldsfld 0x04000001 -> ldloc V_0");
//! log.record(EventKind::Info).message("pass finished");
//!
//! assert_eq!(log.count_kind(EventKind::AccessRewritten), 1);
//! assert_eq!(log.summary(), "1 access rewritten");
//! ```

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use crate::metadata::token::Token;

/// Categories of events that can be logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A static field access was turned into a local variable access.
    AccessRewritten,
    /// A local variable was added to a method body.
    LocalCreated,
    /// An obfuscation artifact was removed (field, method, type).
    ArtifactRemoved,

    /// A field was identified as a hoisted local.
    CandidateIdentified,

    /// A pass started.
    PassStarted,
    /// A pass completed.
    PassCompleted,

    /// Informational message.
    Info,
    /// Warning (something unexpected but recoverable).
    Warning,
}

impl EventKind {
    /// Returns a human-readable description of this event kind.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            // Transformations
            Self::AccessRewritten => "access rewritten",
            Self::LocalCreated => "local created",
            Self::ArtifactRemoved => "artifact removed",
            // Analysis
            Self::CandidateIdentified => "candidate identified",
            // Engine
            Self::PassStarted => "pass started",
            Self::PassCompleted => "pass completed",
            // Diagnostic
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }

    /// Returns true if this event represents a code or metadata transformation.
    #[must_use]
    pub fn is_transformation(&self) -> bool {
        matches!(
            self,
            Self::AccessRewritten | Self::LocalCreated | Self::ArtifactRemoved
        )
    }

    /// Returns true if this is a diagnostic event (info or warning).
    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        matches!(self, Self::Info | Self::Warning)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single logged event.
#[derive(Debug, Clone)]
pub struct Event {
    /// The type of event.
    pub kind: EventKind,
    /// The method where the event occurred (if applicable).
    pub method: Option<Token>,
    /// Instruction index within the method.
    pub location: Option<usize>,
    /// Human-readable description.
    pub message: String,
    /// Associated pass name (if from a pass).
    pub pass: Option<String>,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.method {
            Some(method) => write!(f, "[{}] {}: {}", self.kind, method, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Builder for creating events with a fluent API.
///
/// Created by [`EventLog::record`]. The event is added to the log when the
/// builder is dropped.
pub struct EventBuilder<'a> {
    log: &'a EventLog,
    kind: EventKind,
    method: Option<Token>,
    location: Option<usize>,
    message: Option<String>,
    pass: Option<String>,
}

impl<'a> EventBuilder<'a> {
    fn new(log: &'a EventLog, kind: EventKind) -> Self {
        Self {
            log,
            kind,
            method: None,
            location: None,
            message: None,
            pass: None,
        }
    }

    /// Sets the method and instruction index where the event occurred.
    pub fn at(mut self, method: Token, location: usize) -> Self {
        self.method = Some(method);
        self.location = Some(location);
        self
    }

    /// Sets only the method (for method-level events without specific location).
    pub fn method(mut self, method: Token) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets a custom message describing the event.
    pub fn message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Associates this event with a specific pass.
    pub fn pass(mut self, pass_name: impl Into<String>) -> Self {
        self.pass = Some(pass_name.into());
        self
    }
}

impl Drop for EventBuilder<'_> {
    fn drop(&mut self) {
        let message = self
            .message
            .take()
            .unwrap_or_else(|| self.kind.description().to_string());

        let event = Event {
            kind: self.kind,
            method: self.method.take(),
            location: self.location.take(),
            message,
            pass: self.pass.take(),
        };

        self.log.events.push(event);
    }
}

/// Collection of events from deobfuscation.
///
/// This type is append-only and thread-safe: events can be pushed through a
/// shared reference (`&self`).
#[derive(Debug)]
pub struct EventLog {
    events: boxcar::Vec<Event>,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventLog {
    fn clone(&self) -> Self {
        let new_log = Self::new();
        for (_, event) in &self.events {
            new_log.events.push(event.clone());
        }
        new_log
    }
}

impl EventLog {
    /// Creates an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: boxcar::Vec::new(),
        }
    }

    /// Returns true if no events have been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.count() == 0
    }

    /// Returns the total number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.count()
    }

    /// Starts building a new event of the given kind.
    ///
    /// The event is added when the builder is dropped.
    pub fn record(&self, kind: EventKind) -> EventBuilder<'_> {
        EventBuilder::new(self, kind)
    }

    /// Returns true if any event of the given kind exists.
    #[must_use]
    pub fn has(&self, kind: EventKind) -> bool {
        self.events.iter().any(|(_, e)| e.kind == kind)
    }

    /// Counts events of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: EventKind) -> usize {
        self.events.iter().filter(|(_, e)| e.kind == kind).count()
    }

    /// Returns an iterator over all events.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|(_, e)| e)
    }

    /// Returns an iterator over events of a specific kind.
    pub fn filter_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> + '_ {
        self.events
            .iter()
            .filter_map(move |(_, e)| if e.kind == kind { Some(e) } else { None })
    }

    /// Returns an iterator over events for a specific method.
    pub fn filter_method(&self, method: Token) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter().filter_map(move |(_, e)| {
            if e.method == Some(method) {
                Some(e)
            } else {
                None
            }
        })
    }

    /// Returns an iterator over warning events.
    pub fn warnings(&self) -> impl Iterator<Item = &Event> + '_ {
        self.filter_kind(EventKind::Warning)
    }

    /// Counts events grouped by kind.
    #[must_use]
    pub fn count_by_kind(&self) -> HashMap<EventKind, usize> {
        let mut counts = HashMap::new();
        for (_, event) in &self.events {
            *counts.entry(event.kind).or_insert(0) += 1;
        }
        counts
    }

    /// Returns the number of transformation events.
    #[must_use]
    pub fn transformation_count(&self) -> usize {
        self.events
            .iter()
            .filter(|(_, e)| e.kind.is_transformation())
            .count()
    }

    /// Returns the number of unique methods with events.
    #[must_use]
    pub fn methods_affected(&self) -> usize {
        self.events
            .iter()
            .filter_map(|(_, e)| e.method)
            .collect::<HashSet<_>>()
            .len()
    }

    /// Generates a human-readable summary of the transformation events.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return "no events".to_string();
        }

        let mut parts: Vec<String> = self
            .count_by_kind()
            .iter()
            .filter(|(k, _)| k.is_transformation())
            .map(|(kind, count)| format!("{} {}", count, kind.description()))
            .collect();

        if parts.is_empty() {
            return format!("{} events", self.len());
        }

        parts.sort();
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_records_on_drop() {
        let log = EventLog::new();
        log.record(EventKind::ArtifactRemoved)
            .method(Token::new(0x0600_0001))
            .pass("HoistedLocals");

        assert_eq!(log.len(), 1);
        let event = log.iter().next().unwrap();
        assert_eq!(event.message, "artifact removed");
        assert_eq!(event.pass.as_deref(), Some("HoistedLocals"));
        assert_eq!(event.location, None);
    }

    #[test]
    fn test_queries() {
        let log = EventLog::new();
        let m1 = Token::new(0x0600_0001);
        let m2 = Token::new(0x0600_0002);
        log.record(EventKind::AccessRewritten).at(m1, 0);
        log.record(EventKind::AccessRewritten).at(m1, 4);
        log.record(EventKind::LocalCreated).method(m2);
        log.record(EventKind::Warning).message("field has no type");
        log.record(EventKind::Info).message("done");

        assert_eq!(log.count_kind(EventKind::AccessRewritten), 2);
        assert!(log.has(EventKind::LocalCreated));
        assert!(!log.has(EventKind::ArtifactRemoved));
        assert_eq!(log.filter_method(m1).count(), 2);
        assert_eq!(log.warnings().count(), 1);
        assert_eq!(log.transformation_count(), 3);
        assert_eq!(log.methods_affected(), 2);
        assert_eq!(log.summary(), "1 local created, 2 access rewritten");
    }

    #[test]
    fn test_summary_without_transformations() {
        let log = EventLog::new();
        assert_eq!(log.summary(), "no events");
        log.record(EventKind::Info).message("a");
        log.record(EventKind::PassStarted);
        assert_eq!(log.summary(), "2 events");
    }

    #[test]
    fn test_clone_copies_events() {
        let log = EventLog::new();
        log.record(EventKind::LocalCreated).method(Token::new(0x0600_0001));
        let copy = log.clone();
        copy.record(EventKind::Info);

        assert_eq!(log.len(), 1);
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.iter().next().unwrap().kind, EventKind::LocalCreated);
    }
}
