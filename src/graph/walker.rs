//! Depth-first traversal of import references.

use std::io;
use std::path::{Path, PathBuf};

use super::{
    AnalysisState, EdgeId, FileSource, ImportEdge, Issue, IssueKind, NodeId, TraversalEvent,
    VisitResult, normalize_lexically,
};
use crate::logging::Log;
use crate::scan::{ImportExtractor, ImportKind, KeyScanner};

/// Traversal guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Deepest depth at which a file is still read (roots are 0).
    pub max_depth: usize,
    /// Maximum number of nodes created in one run.
    pub max_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_nodes: 10_000,
        }
    }
}

/// A pending visit on the explicit stack.
#[derive(Debug)]
struct Frame {
    path: PathBuf,
    depth: usize,
    parent: Option<NodeId>,
    edge: Option<EdgeId>,
}

/// Walks import references from root files, filling an [`AnalysisState`].
///
/// Traversal is depth-first with an explicit stack. Children are pushed in
/// reverse so that they pop in source order, which makes the event sequence
/// identical to a recursive pre-order walk.
pub struct Walker<'a> {
    source: &'a dyn FileSource,
    extractor: ImportExtractor,
    scanner: KeyScanner,
    limits: Limits,
    log: &'a dyn Log,
}

impl std::fmt::Debug for Walker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("extractor", &self.extractor)
            .field("scanner", &self.scanner)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl<'a> Walker<'a> {
    /// Create a walker with default [`Limits`].
    #[must_use]
    pub fn new(
        source: &'a dyn FileSource,
        extractor: ImportExtractor,
        scanner: KeyScanner,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            source,
            extractor,
            scanner,
            limits: Limits::default(),
            log,
        }
    }

    /// Replace the traversal guards.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Analyze every root in order and return the collected state.
    ///
    /// Each call starts from an empty state. Roots already reached through
    /// an earlier root are reported as revisits.
    pub fn analyze(&self, roots: &[PathBuf]) -> AnalysisState {
        let mut state = AnalysisState::new();
        for root in roots {
            self.visit(&mut state, root, 0, None);
        }
        self.log.debug(&format!(
            "walk finished: {} nodes, {} edges, {} issues",
            state.nodes().len(),
            state.edges().len(),
            state.issues().len()
        ));
        state
    }

    /// Visit `path` and, on a first visit, everything reachable from it.
    ///
    /// Returns the outcome for `path` itself.
    pub fn visit(
        &self,
        state: &mut AnalysisState,
        path: &Path,
        depth: usize,
        parent: Option<NodeId>,
    ) -> VisitResult {
        let mut stack = Vec::new();
        let result = self.step(
            state,
            Frame {
                path: path.to_path_buf(),
                depth,
                parent,
                edge: None,
            },
            &mut stack,
        );
        while let Some(frame) = stack.pop() {
            self.step(state, frame, &mut stack);
        }
        result
    }

    /// Process one frame and record its event. On a first visit the
    /// node's traversable imports are pushed onto `stack`.
    fn step(
        &self,
        state: &mut AnalysisState,
        frame: Frame,
        stack: &mut Vec<Frame>,
    ) -> VisitResult {
        let (key, exists) = match self.source.canonicalize(&frame.path) {
            Ok(canonical) => (canonical, Ok(())),
            Err(e) if is_absent(&e) => (normalize_lexically(&frame.path), Err(None)),
            Err(e) => (normalize_lexically(&frame.path), Err(Some(e))),
        };

        let (result, node) = self.classify(state, &frame, &key, exists, stack);

        if let Some(edge) = frame.edge {
            state.set_outcome(edge, result);
        }
        state.push_event(TraversalEvent {
            depth: frame.depth,
            edge: frame.edge,
            path: key,
            node,
            result,
        });
        result
    }

    fn classify(
        &self,
        state: &mut AnalysisState,
        frame: &Frame,
        key: &Path,
        exists: Result<(), Option<io::Error>>,
        stack: &mut Vec<Frame>,
    ) -> (VisitResult, Option<NodeId>) {
        if let Some(id) = state.lookup(key) {
            let cycle = frame.parent.is_some_and(|p| state.is_ancestor(id, p));
            if cycle {
                self.record(state, Issue {
                    kind: IssueKind::CycleDetected,
                    path: key.to_path_buf(),
                    line: edge_line(state, frame.edge),
                    detail: importer_detail(state, frame.parent),
                });
            } else {
                self.log.debug(&format!("already visited {}", key.display()));
            }
            return (VisitResult::AlreadyVisited { cycle }, Some(id));
        }

        match exists {
            Ok(()) => {}
            Err(None) => {
                let kind = if frame.edge.is_some() {
                    IssueKind::DanglingReference
                } else {
                    IssueKind::MissingFile
                };
                self.record(state, Issue {
                    kind,
                    path: key.to_path_buf(),
                    line: edge_line(state, frame.edge),
                    detail: importer_detail(state, frame.parent),
                });
                return (VisitResult::Missing, None);
            }
            Err(Some(e)) => {
                self.unreadable(state, key, &e);
                return (VisitResult::Unreadable, None);
            }
        }

        if frame.depth > self.limits.max_depth {
            self.record(state, Issue {
                kind: IssueKind::DepthLimitExceeded,
                path: key.to_path_buf(),
                line: None,
                detail: format!("depth {} exceeds {}", frame.depth, self.limits.max_depth),
            });
            return (VisitResult::LimitReached, None);
        }
        if state.nodes().len() >= self.limits.max_nodes {
            self.record(state, Issue {
                kind: IssueKind::NodeLimitReached,
                path: key.to_path_buf(),
                line: None,
                detail: format!("{} nodes already analyzed", self.limits.max_nodes),
            });
            return (VisitResult::LimitReached, None);
        }

        let contents = match self.source.read(key) {
            Ok(contents) => contents,
            Err(e) => {
                self.unreadable(state, key, &e);
                return (VisitResult::Unreadable, None);
            }
        };

        let (text, lossy) = match String::from_utf8(contents.bytes) {
            Ok(text) => (Some(text), None),
            Err(e) => {
                self.record(state, Issue {
                    kind: IssueKind::UndecodableContent,
                    path: key.to_path_buf(),
                    line: None,
                    detail: e.utf8_error().to_string(),
                });
                (None, Some(String::from_utf8_lossy(e.as_bytes()).into_owned()))
            }
        };

        self.log.debug(&format!(
            "visit {} (depth {})",
            key.display(),
            frame.depth
        ));
        let id = state.insert_node(
            key.to_path_buf(),
            frame.depth,
            frame.parent,
            text.clone(),
            contents.modified,
        );

        if let Some(text) = &text {
            state.extend_occurrences(self.scanner.scan(text, id));
        }
        if let Some(source_text) = text.as_deref().or(lossy.as_deref()) {
            self.expand(state, id, key, source_text, frame.depth, stack);
        }
        (VisitResult::Visited, Some(id))
    }

    /// Extract imports from a freshly created node and schedule the
    /// traversable ones.
    fn expand(
        &self,
        state: &mut AnalysisState,
        id: NodeId,
        path: &Path,
        text: &str,
        depth: usize,
        stack: &mut Vec<Frame>,
    ) {
        let extraction = self.extractor.extract(text);
        for skipped in extraction.unparseable {
            self.record(state, Issue {
                kind: IssueKind::UnparseableImportLine,
                path: path.to_path_buf(),
                line: Some(skipped.line),
                detail: skipped.reason,
            });
        }

        let dir = path.parent().unwrap_or(path);
        let mut children = Vec::new();
        for import in extraction.imports {
            let resolved = match import.kind {
                ImportKind::Relative => Some(dir.join(&import.target)),
                ImportKind::Absolute => Some(PathBuf::from(&import.target)),
                ImportKind::External | ImportKind::Dynamic => {
                    self.log.debug(&format!(
                        "{} import not followed: {} ({}:{})",
                        import.kind.label(),
                        import.target,
                        path.display(),
                        import.line
                    ));
                    None
                }
            };
            let edge = state.push_edge(ImportEdge {
                source: id,
                target: import.target,
                kind: import.kind,
                line: import.line,
                list: import.list,
                resolved: resolved.clone(),
                outcome: None,
            });
            if let Some(resolved) = resolved {
                children.push(Frame {
                    path: resolved,
                    depth: depth + 1,
                    parent: Some(id),
                    edge: Some(edge),
                });
            }
        }
        stack.extend(children.into_iter().rev());
    }

    fn unreadable(&self, state: &mut AnalysisState, key: &Path, err: &io::Error) {
        self.record(state, Issue {
            kind: IssueKind::UnreadableFile,
            path: key.to_path_buf(),
            line: None,
            detail: err.to_string(),
        });
    }

    fn record(&self, state: &mut AnalysisState, issue: Issue) {
        self.log.issue(&issue);
        state.push_issue(issue);
    }
}

fn edge_line(state: &AnalysisState, edge: Option<EdgeId>) -> Option<usize> {
    edge.and_then(|e| state.edge(e)).map(|e| e.line)
}

fn importer_detail(state: &AnalysisState, parent: Option<NodeId>) -> String {
    parent
        .and_then(|p| state.node(p))
        .map(|n| format!("imported from {}", n.path.display()))
        .unwrap_or_default()
}

fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
