//! Indented dependency tree.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use super::display_path;
use crate::graph::{AnalysisState, EdgeId, NodeId, VisitResult};

/// Indentation per depth level.
const INDENT: &str = "  ";

enum Item {
    Event(usize),
    Leaf(EdgeId, usize),
}

/// Render the traversal as an indented tree.
///
/// One line per traversal event in pre-order. Under each visited file its
/// imports appear in source order; external and dynamic ones are leaves
/// marked `[external]` or `[dynamic]`.
#[must_use]
pub fn render_tree(state: &AnalysisState, root: &Path) -> String {
    let by_edge: HashMap<EdgeId, usize> = state
        .events()
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.edge.map(|edge| (edge, i)))
        .collect();
    let mut by_source: HashMap<NodeId, Vec<EdgeId>> = HashMap::new();
    for (i, edge) in state.edges().iter().enumerate() {
        by_source.entry(edge.source).or_default().push(EdgeId(i));
    }

    let mut stack: Vec<Item> = state
        .events()
        .iter()
        .enumerate()
        .filter(|(_, e)| e.edge.is_none())
        .map(|(i, _)| Item::Event(i))
        .rev()
        .collect();

    let mut out = String::new();
    while let Some(item) = stack.pop() {
        match item {
            Item::Leaf(edge, depth) => {
                if let Some(edge) = state.edge(edge) {
                    let _ = writeln!(
                        out,
                        "{}{} [{}]",
                        INDENT.repeat(depth),
                        edge.target,
                        edge.kind.label()
                    );
                }
            }
            Item::Event(idx) => {
                let Some(event) = state.events().get(idx) else {
                    continue;
                };
                let _ = writeln!(
                    out,
                    "{}{}{}",
                    INDENT.repeat(event.depth),
                    display_path(root, &event.path),
                    marker(event.result)
                );
                if event.result == VisitResult::Visited
                    && let Some(node) = event.node
                {
                    let edges = by_source.get(&node).map_or(&[][..], Vec::as_slice);
                    let children = children(state, edges, event.depth + 1, &by_edge);
                    stack.extend(children.into_iter().rev());
                }
            }
        }
    }
    out
}

/// Items under a visited node: `edges` are its edges in source order.
fn children(
    state: &AnalysisState,
    edges: &[EdgeId],
    depth: usize,
    by_edge: &HashMap<EdgeId, usize>,
) -> Vec<Item> {
    edges
        .iter()
        .filter_map(|&id| {
            let edge = state.edge(id)?;
            if edge.kind.is_traversable() {
                by_edge.get(&id).map(|&event| Item::Event(event))
            } else {
                Some(Item::Leaf(id, depth))
            }
        })
        .collect()
}

const fn marker(result: VisitResult) -> &'static str {
    match result {
        VisitResult::Visited => "",
        VisitResult::AlreadyVisited { cycle: false } => " (already visited)",
        VisitResult::AlreadyVisited { cycle: true } => " (cycle)",
        VisitResult::Missing => " (missing)",
        VisitResult::Unreadable => " (unreadable)",
        VisitResult::LimitReached => " (limit reached)",
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::report::test_support::{analyze_tree, diamond};

    #[test]
    fn diamond_tree() {
        let (_dir, root, state) = diamond();
        insta::assert_snapshot!(render_tree(&state, &root), @r"
        root.cfg
          a.cfg
            common.cfg
          b.cfg
            common.cfg (already visited)
        ");
    }

    #[test]
    fn markers_and_leaves() {
        let (_dir, root, state) = analyze_tree(
            &[
                (
                    "root.cfg",
                    "imports = [\n  <nixpkgs/x.cfg>\n  ./loop.cfg\n  ./gone.cfg\n  (import ./gen.cfg {})\n];\n",
                ),
                ("loop.cfg", "imports = [ ./root.cfg ];\n"),
            ],
            &["root.cfg", "absent.cfg"],
        );
        insta::assert_snapshot!(render_tree(&state, &root), @r"
        root.cfg
          <nixpkgs/x.cfg> [external]
          loop.cfg
            root.cfg (cycle)
          gone.cfg (missing)
          (import ./gen.cfg {}) [dynamic]
        absent.cfg (missing)
        ");
    }

    #[test]
    fn second_root_already_reached_is_a_plain_revisit() {
        let (_dir, root, state) = analyze_tree(
            &[("a.cfg", "imports = [ ./b.cfg ];\n"), ("b.cfg", "")],
            &["a.cfg", "b.cfg"],
        );
        insta::assert_snapshot!(render_tree(&state, &root), @r"
        a.cfg
          b.cfg
        b.cfg (already visited)
        ");
    }

    #[test]
    fn empty_state_renders_nothing() {
        assert_eq!(render_tree(&AnalysisState::new(), Path::new("/")), "");
    }
}
