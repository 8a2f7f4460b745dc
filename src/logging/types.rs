//! The [`Log`] trait shared by every component that reports progress.

use crate::graph::Issue;

/// Abstraction over logging backends.
///
/// The walker and the commands log through this trait so tests can capture
/// messages without installing a global subscriber.
pub trait Log {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning that is not tied to a traversal issue.
    fn warn(&self, msg: &str);
    /// Report an issue recorded while walking the import graph.
    fn issue(&self, issue: &Issue);
}

/// A [`Log`] that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl Log for NullLog {
    fn stage(&self, _msg: &str) {}
    fn info(&self, _msg: &str) {}
    fn debug(&self, _msg: &str) {}
    fn warn(&self, _msg: &str) {}
    fn issue(&self, _issue: &Issue) {}
}
