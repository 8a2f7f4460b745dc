//! Dependency graph model and traversal.
//!
//! [`Walker`] fills an [`AnalysisState`] by following import references from
//! one or more root files. The state owns every node, edge, traversal event,
//! key occurrence and recovered [`Issue`] of a single run; a new run starts
//! from a fresh state.

pub mod conflicts;
pub mod source;
pub mod walker;

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;

pub use conflicts::{ConflictRecord, Contribution, derive_conflicts};
pub use source::{DiskSource, FileContents, FileSource, normalize_lexically};
pub use walker::{Limits, Walker};

use crate::scan::{ImportKind, KeyOccurrence, ListKind};

/// Discovery-order index of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Index of an edge in [`AnalysisState::edges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

/// A configuration file that was read during the walk.
#[derive(Debug, Clone, Serialize)]
pub struct Node {
    /// Discovery-order index.
    pub id: NodeId,
    /// Canonical absolute path; the node's identity.
    pub path: PathBuf,
    /// Depth at first discovery (roots are 0).
    pub depth: usize,
    /// The node that first imported this one; `None` for roots.
    pub parent: Option<NodeId>,
    /// File text, or `None` if the bytes were not valid UTF-8.
    #[serde(skip)]
    pub text: Option<String>,
    /// Last modification time reported by the filesystem.
    #[serde(skip)]
    pub modified: Option<SystemTime>,
}

/// One import reference extracted from a node.
#[derive(Debug, Clone, Serialize)]
pub struct ImportEdge {
    /// Importing node.
    pub source: NodeId,
    /// Target as written in the source.
    pub target: String,
    /// Classification of the target.
    pub kind: ImportKind,
    /// 1-based line of the reference in the source node.
    pub line: usize,
    /// The list the reference was written in.
    pub list: ListKind,
    /// Filesystem path the target resolves to, for traversable kinds.
    pub resolved: Option<PathBuf>,
    /// Result of following the edge; `None` until walked or for kinds that
    /// are never followed.
    pub outcome: Option<VisitResult>,
}

/// Outcome of visiting a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitResult {
    /// First visit: the node was created and its imports followed.
    Visited,
    /// The node had been visited before; nothing was re-read.
    AlreadyVisited {
        /// The target is the importing node or one of its ancestors.
        cycle: bool,
    },
    /// No file exists at the path.
    Missing,
    /// The file exists but could not be read.
    Unreadable,
    /// A depth or node-count guard stopped the walk here.
    LimitReached,
}

/// One attempt to follow an edge (or a root entry), in pre-order.
#[derive(Debug, Clone, Serialize)]
pub struct TraversalEvent {
    /// Depth of the attempt (roots are 0).
    pub depth: usize,
    /// Edge being followed; `None` for root entries.
    pub edge: Option<EdgeId>,
    /// Identity path of the target.
    pub path: PathBuf,
    /// Node reached, if any.
    pub node: Option<NodeId>,
    /// What happened.
    pub result: VisitResult,
}

/// Category of a recovered analysis problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    /// A root entry file does not exist.
    MissingFile,
    /// A file exists but could not be read.
    UnreadableFile,
    /// A line inside an import list could not be tokenized and was skipped.
    UnparseableImportLine,
    /// An import resolves to a path with no file.
    DanglingReference,
    /// An import points back at the importing node or one of its ancestors.
    CycleDetected,
    /// A file's bytes are not valid UTF-8; it was not scanned.
    UndecodableContent,
    /// The walk reached the configured maximum depth.
    DepthLimitExceeded,
    /// The walk reached the configured maximum node count.
    NodeLimitReached,
}

impl IssueKind {
    /// Short label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MissingFile => "missing file",
            Self::UnreadableFile => "unreadable file",
            Self::UnparseableImportLine => "unparseable import line",
            Self::DanglingReference => "dangling reference",
            Self::CycleDetected => "cycle",
            Self::UndecodableContent => "undecodable content",
            Self::DepthLimitExceeded => "depth limit",
            Self::NodeLimitReached => "node limit",
        }
    }
}

/// A recovered problem found during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Category.
    pub kind: IssueKind,
    /// File the issue is about.
    pub path: PathBuf,
    /// 1-based line, when the issue points into a file.
    pub line: Option<usize>,
    /// Human-readable detail.
    pub detail: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.path.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if !self.detail.is_empty() {
            write!(f, " ({})", self.detail)?;
        }
        Ok(())
    }
}

/// Everything collected during one analysis run.
#[derive(Debug, Default, Serialize)]
pub struct AnalysisState {
    nodes: Vec<Node>,
    #[serde(skip)]
    index: HashMap<PathBuf, NodeId>,
    edges: Vec<ImportEdge>,
    events: Vec<TraversalEvent>,
    occurrences: Vec<KeyOccurrence>,
    issues: Vec<Issue>,
}

impl AnalysisState {
    /// Create an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in discovery order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Every extracted import reference, grouped by source node in
    /// discovery order.
    #[must_use]
    pub fn edges(&self) -> &[ImportEdge] {
        &self.edges
    }

    /// Traversal attempts in pre-order.
    #[must_use]
    pub fn events(&self) -> &[TraversalEvent] {
        &self.events
    }

    /// Key occurrences in discovery order.
    #[must_use]
    pub fn occurrences(&self) -> &[KeyOccurrence] {
        &self.occurrences
    }

    /// Recovered issues in the order they were found.
    #[must_use]
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Look up an edge by id.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<&ImportEdge> {
        self.edges.get(id.0)
    }

    /// Look up a node by canonical path.
    #[must_use]
    pub fn lookup(&self, path: &Path) -> Option<NodeId> {
        self.index.get(path).copied()
    }

    /// Number of issues of `kind`.
    #[must_use]
    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }

    /// Whether `candidate` is `node` itself or on `node`'s first-discoverer
    /// chain.
    #[must_use]
    pub fn is_ancestor(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    /// Newest modification time among visited nodes.
    #[must_use]
    pub fn newest_modification(&self) -> Option<SystemTime> {
        self.nodes.iter().filter_map(|n| n.modified).max()
    }

    /// Conflict records derived from the collected occurrences.
    #[must_use]
    pub fn conflicts(&self) -> Vec<ConflictRecord> {
        derive_conflicts(self)
    }

    /// Register a new node. The caller has already checked that `path` is
    /// not in the index.
    pub(crate) fn insert_node(
        &mut self,
        path: PathBuf,
        depth: usize,
        parent: Option<NodeId>,
        text: Option<String>,
        modified: Option<SystemTime>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.index.insert(path.clone(), id);
        self.nodes.push(Node {
            id,
            path,
            depth,
            parent,
            text,
            modified,
        });
        id
    }

    pub(crate) fn push_edge(&mut self, edge: ImportEdge) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(edge);
        id
    }

    pub(crate) fn set_outcome(&mut self, edge: EdgeId, result: VisitResult) {
        if let Some(e) = self.edges.get_mut(edge.0) {
            e.outcome = Some(result);
        }
    }

    pub(crate) fn push_event(&mut self, event: TraversalEvent) {
        self.events.push(event);
    }

    pub(crate) fn push_issue(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub(crate) fn extend_occurrences(&mut self, found: Vec<KeyOccurrence>) {
        self.occurrences.extend(found);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn chain() -> AnalysisState {
        let mut state = AnalysisState::new();
        let a = state.insert_node(PathBuf::from("/a"), 0, None, None, None);
        let b = state.insert_node(PathBuf::from("/b"), 1, Some(a), None, None);
        state.insert_node(PathBuf::from("/c"), 2, Some(b), None, None);
        state.insert_node(PathBuf::from("/d"), 1, Some(a), None, None);
        state
    }

    #[test]
    fn node_ids_follow_discovery_order() {
        let state = chain();
        let ids: Vec<usize> = state.nodes().iter().map(|n| n.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(state.lookup(Path::new("/c")), Some(NodeId(2)));
        assert_eq!(state.lookup(Path::new("/zzz")), None);
    }

    #[test]
    fn ancestor_chain_includes_self() {
        let state = chain();
        assert!(state.is_ancestor(NodeId(2), NodeId(2)));
        assert!(state.is_ancestor(NodeId(0), NodeId(2)));
        assert!(state.is_ancestor(NodeId(1), NodeId(2)));
    }

    #[test]
    fn sibling_is_not_an_ancestor() {
        let state = chain();
        assert!(!state.is_ancestor(NodeId(3), NodeId(2)));
        assert!(!state.is_ancestor(NodeId(2), NodeId(0)));
    }

    #[test]
    fn newest_modification_picks_max() {
        let mut state = AnalysisState::new();
        let early = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(10);
        let late = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(20);
        state.insert_node(PathBuf::from("/a"), 0, None, None, Some(late));
        state.insert_node(PathBuf::from("/b"), 0, None, None, Some(early));
        state.insert_node(PathBuf::from("/c"), 0, None, None, None);
        assert_eq!(state.newest_modification(), Some(late));
        assert_eq!(AnalysisState::new().newest_modification(), None);
    }

    #[test]
    fn issue_display_with_line() {
        let issue = Issue {
            kind: IssueKind::UnparseableImportLine,
            path: PathBuf::from("/etc/nixos/a.nix"),
            line: Some(4),
            detail: "unterminated string".to_string(),
        };
        assert_eq!(
            issue.to_string(),
            "unparseable import line: /etc/nixos/a.nix:4 (unterminated string)"
        );
    }

    #[test]
    fn issue_display_without_detail() {
        let issue = Issue {
            kind: IssueKind::MissingFile,
            path: PathBuf::from("/x.nix"),
            line: None,
            detail: String::new(),
        };
        assert_eq!(issue.to_string(), "missing file: /x.nix");
    }

    #[test]
    fn visit_result_serializes_kebab_case() {
        let json = serde_json::to_string(&VisitResult::AlreadyVisited { cycle: true }).unwrap();
        assert_eq!(json, r#"{"already-visited":{"cycle":true}}"#);
        let json = serde_json::to_string(&VisitResult::LimitReached).unwrap();
        assert_eq!(json, r#""limit-reached""#);
    }
}
