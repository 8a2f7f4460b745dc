//! Cross-file key conflicts.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use serde::Serialize;

use super::{AnalysisState, NodeId};
use crate::scan::{KeyOccurrence, OccurrenceKind};

/// One file's contribution to a conflict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contribution {
    /// Node the occurrence was found in.
    pub node: NodeId,
    /// Path of that node.
    pub path: PathBuf,
    /// 1-based line.
    pub line: usize,
    /// How the key was used.
    pub kind: OccurrenceKind,
}

/// A key defined in two or more distinct files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    /// The conflicting key.
    pub key: String,
    /// Every definition of the key, by discovery order then line.
    pub occurrences: Vec<Contribution>,
}

impl ConflictRecord {
    /// Distinct files involved, in discovery order.
    #[must_use]
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut seen = Vec::new();
        for c in &self.occurrences {
            if !seen.contains(&c.node) {
                seen.push(c.node);
            }
        }
        seen
    }
}

/// Group key definitions and keep keys defined in at least two distinct
/// nodes.
///
/// Reads of a key never contribute. Records are ordered by key. Occurrences
/// whose node is unknown to `state` are ignored.
#[must_use]
pub fn derive_conflicts(state: &AnalysisState) -> Vec<ConflictRecord> {
    let mut by_key: BTreeMap<&str, Vec<&KeyOccurrence>> = BTreeMap::new();
    for occ in state.occurrences().iter().filter(|o| o.definition) {
        by_key.entry(occ.key.as_str()).or_default().push(occ);
    }

    by_key
        .into_iter()
        .filter_map(|(key, mut occs)| {
            let distinct: BTreeSet<NodeId> = occs.iter().map(|o| o.node).collect();
            if distinct.len() < 2 {
                return None;
            }
            occs.sort_by_key(|o| (o.node, o.line));
            let occurrences = occs
                .into_iter()
                .filter_map(|o| {
                    state.node(o.node).map(|n| Contribution {
                        node: o.node,
                        path: n.path.clone(),
                        line: o.line,
                        kind: o.kind,
                    })
                })
                .collect();
            Some(ConflictRecord {
                key: key.to_string(),
                occurrences,
            })
        })
        .collect()
}
