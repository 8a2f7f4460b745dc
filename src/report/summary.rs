//! Plain-text analysis summary.

use std::fmt::Write as _;
use std::path::Path;

use super::{Counts, display_path};
use crate::graph::{AnalysisState, ConflictRecord};

/// Render counts, issues and one line per conflict.
///
/// Conflict lines read `key: file:line (kind), file:line (kind)`.
#[must_use]
pub fn render_summary(state: &AnalysisState, conflicts: &[ConflictRecord], root: &Path) -> String {
    let counts = Counts::collect(state, conflicts);
    let mut out = String::new();

    let _ = writeln!(out, "Nodes processed:     {}", counts.nodes);
    let _ = writeln!(
        out,
        "Imports:             {} ({} external, {} dynamic)",
        counts.imports, counts.external, counts.dynamic
    );
    let _ = writeln!(out, "Revisits:            {}", counts.revisits);
    let _ = writeln!(out, "Dangling references: {}", counts.dangling);
    let _ = writeln!(out, "Missing entries:     {}", counts.missing_entries);
    let _ = writeln!(out, "Unreadable files:    {}", counts.unreadable);
    let _ = writeln!(out, "Cycles:              {}", counts.cycles);
    if counts.undecodable > 0 {
        let _ = writeln!(out, "Undecodable files:   {}", counts.undecodable);
    }
    if counts.unparseable_lines > 0 {
        let _ = writeln!(out, "Skipped lines:       {}", counts.unparseable_lines);
    }
    if counts.limits > 0 {
        let _ = writeln!(out, "Limits reached:      {}", counts.limits);
    }
    let _ = writeln!(out, "Conflicts:           {}", counts.conflicts);

    for record in conflicts {
        let _ = writeln!(out, "  {}", conflict_line(record, root));
    }

    if !state.issues().is_empty() {
        let _ = writeln!(out, "Issues:");
        for issue in state.issues() {
            let location = display_path(root, &issue.path);
            let _ = match issue.line {
                Some(line) => writeln!(out, "  {}: {location}:{line}", issue.kind.label()),
                None => writeln!(out, "  {}: {location}", issue.kind.label()),
            };
        }
    }

    out
}

/// One conflict formatted as `key: file:line (kind), ...`.
#[must_use]
pub fn conflict_line(record: &ConflictRecord, root: &Path) -> String {
    let parts: Vec<String> = record
        .occurrences
        .iter()
        .map(|c| format!("{}:{} ({})", display_path(root, &c.path), c.line, c.kind))
        .collect();
    format!("{}: {}", record.key, parts.join(", "))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::report::test_support::{analyze_tree, diamond};

    #[test]
    fn diamond_summary() {
        let (_dir, root, state) = diamond();
        let conflicts = state.conflicts();
        insta::assert_snapshot!(render_summary(&state, &conflicts, &root), @r"
        Nodes processed:     4
        Imports:             4 (0 external, 0 dynamic)
        Revisits:            1
        Dangling references: 0
        Missing entries:     0
        Unreadable files:    0
        Cycles:              0
        Conflicts:           1
          services.nginx: a.cfg:3 (enabled), b.cfg:3 (package-assignment)
        ");
    }

    #[test]
    fn issues_are_listed_with_locations() {
        let (_dir, root, state) = analyze_tree(
            &[("root.cfg", "{\n  imports = [ ./gone.cfg ];\n}\n")],
            &["root.cfg", "absent.cfg"],
        );
        let text = render_summary(&state, &[], &root);
        assert!(text.contains("Dangling references: 1"));
        assert!(text.contains("Missing entries:     1"));
        assert!(text.contains(
            "Issues:\n  dangling reference: gone.cfg:2\n  missing file: absent.cfg\n"
        ));
    }

    #[test]
    fn optional_counts_appear_only_when_nonzero() {
        let (_dir, root, state) = diamond();
        let text = render_summary(&state, &[], &root);
        assert!(!text.contains("Undecodable"));
        assert!(!text.contains("Skipped lines"));
        assert!(!text.contains("Limits reached"));
    }
}
