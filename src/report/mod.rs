//! Rendering of a completed analysis.
//!
//! Every renderer is a pure function of the [`AnalysisState`] plus the root
//! used to shorten paths, so output is deterministic for an unchanged tree.

pub mod chain;
pub mod summary;
pub mod tree;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::graph::{AnalysisState, ConflictRecord, IssueKind, VisitResult};
use crate::scan::ImportKind;

pub use chain::{default_chain_path, format_chain, write_chain};
pub use summary::render_summary;
pub use tree::render_tree;

/// Show `path` relative to `root` when it lies underneath, otherwise as is.
#[must_use]
pub fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .map_or_else(|_| path.display().to_string(), |p| p.display().to_string())
}

/// Aggregate counts over one analysis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    /// Files read.
    pub nodes: usize,
    /// Import references extracted.
    pub imports: usize,
    /// External imports recorded but not followed.
    pub external: usize,
    /// Dynamic imports recorded but not followed.
    pub dynamic: usize,
    /// Revisits of already analyzed files, cycles included.
    pub revisits: usize,
    /// Imports that resolve to no file.
    pub dangling: usize,
    /// Entry files that do not exist.
    pub missing_entries: usize,
    /// Files that exist but could not be read.
    pub unreadable: usize,
    /// Revisits that close a cycle.
    pub cycles: usize,
    /// Files that are not valid UTF-8.
    pub undecodable: usize,
    /// Import-list lines that were skipped.
    pub unparseable_lines: usize,
    /// Visits stopped by a depth or node guard.
    pub limits: usize,
    /// Keys defined in more than one file.
    pub conflicts: usize,
}

impl Counts {
    /// Compute counts from a finished state and its conflicts.
    #[must_use]
    pub fn collect(state: &AnalysisState, conflicts: &[ConflictRecord]) -> Self {
        let edges_of = |kind: ImportKind| state.edges().iter().filter(|e| e.kind == kind).count();
        Self {
            nodes: state.nodes().len(),
            imports: state.edges().len(),
            external: edges_of(ImportKind::External),
            dynamic: edges_of(ImportKind::Dynamic),
            revisits: state
                .events()
                .iter()
                .filter(|e| matches!(e.result, VisitResult::AlreadyVisited { .. }))
                .count(),
            dangling: state.count(IssueKind::DanglingReference),
            missing_entries: state.count(IssueKind::MissingFile),
            unreadable: state.count(IssueKind::UnreadableFile),
            cycles: state.count(IssueKind::CycleDetected),
            undecodable: state.count(IssueKind::UndecodableContent),
            unparseable_lines: state.count(IssueKind::UnparseableImportLine),
            limits: state.count(IssueKind::DepthLimitExceeded)
                + state.count(IssueKind::NodeLimitReached),
            conflicts: conflicts.len(),
        }
    }
}

/// Machine-readable form of a full analysis.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// Analysis root.
    pub root: PathBuf,
    /// Entry files as requested.
    pub entries: &'a [PathBuf],
    /// Nodes, edges, events, occurrences and issues.
    #[serde(flatten)]
    pub state: &'a AnalysisState,
    /// Derived conflicts.
    pub conflicts: &'a [ConflictRecord],
    /// Aggregate counts.
    pub counts: Counts,
}

impl<'a> Report<'a> {
    /// Assemble a report.
    #[must_use]
    pub fn new(
        root: &Path,
        entries: &'a [PathBuf],
        state: &'a AnalysisState,
        conflicts: &'a [ConflictRecord],
    ) -> Self {
        Self {
            root: root.to_path_buf(),
            entries,
            state,
            conflicts,
            counts: Counts::collect(state, conflicts),
        }
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, crate::error::ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
