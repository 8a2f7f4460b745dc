//! Key scanning: find option paths from the recognized vocabulary and
//! classify how each line uses them.
//!
//! A key such as `services.nginx` matches as a whole path token: the
//! character before it may be `.` (as in `config.services.nginx.enable`) but
//! not an identifier character, and the character after it must not continue
//! the identifier. Attribute-set blocks (`services.nginx = { ... };`) are
//! followed so that `enable = true;` inside them is attributed to the key.
//!
//! A match on the left of `=` defines the key; anything else only reads it.

use std::fmt;

use serde::Serialize;

use super::{CommentStripper, outside_strings};
use crate::graph::NodeId;

/// How a line uses a recognized key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OccurrenceKind {
    /// `key.enable = true` (or a `mkForce`/`mkDefault` wrapped `true`).
    Enabled,
    /// `key.package = ...`
    PackageAssignment,
    /// Any other mention.
    Reference,
}

impl fmt::Display for OccurrenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Enabled => "enabled",
            Self::PackageAssignment => "package-assignment",
            Self::Reference => "reference",
        })
    }
}

/// One occurrence of a vocabulary key in a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOccurrence {
    /// The vocabulary key that matched.
    pub key: String,
    /// Node the occurrence was found in.
    pub node: NodeId,
    /// 1-based line number.
    pub line: usize,
    /// How the line uses the key.
    pub kind: OccurrenceKind,
    /// The key, or an attribute below it, is assigned here rather than read.
    pub definition: bool,
}

/// An attribute-set block opened by `key = {` that has not closed yet.
#[derive(Debug)]
struct OpenBlock {
    key: usize,
    depth: usize,
}

/// Scans file text for a fixed vocabulary of keys.
#[derive(Debug, Clone)]
pub struct KeyScanner {
    keys: Vec<String>,
}

impl KeyScanner {
    /// Create a scanner for `keys`. Empty entries are ignored.
    #[must_use]
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys
                .into_iter()
                .map(Into::into)
                .filter(|k: &String| !k.trim().is_empty())
                .collect(),
        }
    }

    /// The vocabulary this scanner matches.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Record every occurrence of every vocabulary key in `text`.
    ///
    /// Repeated occurrences within one file are all kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use confgraph::graph::NodeId;
    /// use confgraph::scan::{KeyScanner, OccurrenceKind};
    ///
    /// let scanner = KeyScanner::new(["services.nginx"]);
    /// let found = scanner.scan("services.nginx.enable = true;\n", NodeId(0));
    /// assert_eq!(found.len(), 1);
    /// assert_eq!(found[0].kind, OccurrenceKind::Enabled);
    /// ```
    #[must_use]
    pub fn scan(&self, text: &str, node: NodeId) -> Vec<KeyOccurrence> {
        let mut found = Vec::new();
        let mut stripper = CommentStripper::new();
        let mut block: Option<OpenBlock> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let code = stripper.code(raw);

            if let Some(open) = block.as_mut() {
                let (kinds, closed) = feed_block(&code, &mut open.depth);
                let key = open.key;
                self.push_all(&mut found, key, node, line, kinds, true);
                if closed {
                    block = None;
                }
            }

            let masked = mask_strings(&code);
            for (key_idx, key) in self.keys.iter().enumerate() {
                for pos in path_token_positions(&masked, key) {
                    let rest = masked.get(pos + key.len()..).unwrap_or_default();
                    let usage = classify_usage(rest);
                    self.push_all(
                        &mut found,
                        key_idx,
                        node,
                        line,
                        [usage.kind],
                        usage.definition,
                    );

                    if let Some(after_brace) = usage.block_body
                        && block.is_none()
                    {
                        let mut depth = 1;
                        let (kinds, closed) = feed_block(after_brace, &mut depth);
                        self.push_all(&mut found, key_idx, node, line, kinds, true);
                        if !closed {
                            block = Some(OpenBlock {
                                key: key_idx,
                                depth,
                            });
                        }
                    }
                }
            }
        }

        found
    }

    fn push_all(
        &self,
        found: &mut Vec<KeyOccurrence>,
        key: usize,
        node: NodeId,
        line: usize,
        kinds: impl IntoIterator<Item = OccurrenceKind>,
        definition: bool,
    ) {
        let Some(name) = self.keys.get(key) else {
            return;
        };
        for kind in kinds {
            found.push(KeyOccurrence {
                key: name.clone(),
                node,
                line,
                kind,
                definition,
            });
        }
    }
}

/// Classification of the text following a matched key.
struct Usage<'a> {
    kind: OccurrenceKind,
    definition: bool,
    /// Text after `{` when the key is assigned an attribute set.
    block_body: Option<&'a str>,
}

fn classify_usage(rest: &str) -> Usage<'_> {
    let read = Usage {
        kind: OccurrenceKind::Reference,
        definition: false,
        block_body: None,
    };

    if let Some(after) = rest.strip_prefix('.') {
        let path_len = after
            .find(|c: char| !is_ident_char(c) && c != '.')
            .unwrap_or(after.len());
        let (path, tail) = after.split_at(path_len);
        let Some(value) = assigned_value(tail) else {
            return read;
        };
        let kind = match path {
            "enable" if is_true_like(value) => OccurrenceKind::Enabled,
            "package" => OccurrenceKind::PackageAssignment,
            _ => OccurrenceKind::Reference,
        };
        return Usage {
            kind,
            definition: true,
            block_body: None,
        };
    }

    match assigned_value(rest) {
        Some(value) => Usage {
            kind: OccurrenceKind::Reference,
            definition: true,
            block_body: value.trim_start().strip_prefix('{'),
        },
        None => read,
    }
}

/// If `tail` is `= value`, return the value text (without the `=`).
fn assigned_value(tail: &str) -> Option<&str> {
    let value = tail.trim_start().strip_prefix('=')?;
    if value.starts_with('=') {
        return None;
    }
    Some(value)
}

/// Consume one line of an attribute-set body starting at relative `depth`.
///
/// Returns the classified statements found at depth 1 and whether the block
/// closed on this line.
fn feed_block(code: &str, depth: &mut usize) -> (Vec<OccurrenceKind>, bool) {
    let mut kinds = Vec::new();
    let mut statement = String::new();

    for (_, c) in outside_strings(code) {
        match c {
            '{' => *depth += 1,
            '}' => {
                if *depth == 1 {
                    kinds.extend(classify_statement(&statement));
                    statement.clear();
                }
                *depth = depth.saturating_sub(1);
                if *depth == 0 {
                    return (kinds, true);
                }
            }
            ';' if *depth == 1 => {
                kinds.extend(classify_statement(&statement));
                statement.clear();
            }
            _ if *depth == 1 => statement.push(c),
            _ => {}
        }
    }
    kinds.extend(classify_statement(&statement));
    (kinds, false)
}

fn classify_statement(statement: &str) -> Option<OccurrenceKind> {
    let (attr, value) = statement.split_once('=')?;
    if value.starts_with('=') {
        return None;
    }
    match attr.trim() {
        "enable" if is_true_like(value) => Some(OccurrenceKind::Enabled),
        "package" => Some(OccurrenceKind::PackageAssignment),
        _ => None,
    }
}

/// `true`, optionally wrapped in priority modifiers such as
/// `lib.mkForce true` or `mkOverride 50 true`.
fn is_true_like(value: &str) -> bool {
    let value = value.split(';').next().unwrap_or_default();
    let words: Vec<&str> = value
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c == '(' || c == ')'))
        .filter(|w| !w.is_empty())
        .collect();
    match words.split_last() {
        Some((&"true", modifiers)) => modifiers.iter().all(|m| is_priority_modifier(m)),
        _ => false,
    }
}

fn is_priority_modifier(word: &str) -> bool {
    matches!(
        word.rsplit('.').next(),
        Some("mkForce" | "mkDefault" | "mkOverride")
    ) || word.parse::<u32>().is_ok()
}

const fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '\'')
}

/// Byte offsets of every whole-token match of `key` in `code`.
fn path_token_positions<'a>(code: &'a str, key: &'a str) -> impl Iterator<Item = usize> + 'a {
    code.match_indices(key).map(|(pos, _)| pos).filter(move |&pos| {
        let before_ok = code
            .get(..pos)
            .and_then(|s| s.chars().next_back())
            .is_none_or(|c| !is_ident_char(c));
        let after_ok = code
            .get(pos + key.len()..)
            .and_then(|s| s.chars().next())
            .is_none_or(|c| !is_ident_char(c));
        before_ok && after_ok
    })
}

/// Replace string-literal contents with spaces, preserving byte offsets.
fn mask_strings(code: &str) -> String {
    let visible: Vec<bool> = {
        let mut mask = vec![false; code.len()];
        for (i, c) in outside_strings(code) {
            for slot in mask.iter_mut().skip(i).take(c.len_utf8()) {
                *slot = true;
            }
        }
        mask
    };
    code.char_indices()
        .map(|(i, c)| {
            if visible.get(i).copied().unwrap_or(false) {
                c.to_string()
            } else {
                " ".repeat(c.len_utf8())
            }
        })
        .collect()
}
