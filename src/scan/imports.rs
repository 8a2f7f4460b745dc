//! Import extraction: find `imports = [ ... ]` and `modules = [ ... ]` lists
//! and classify every entry.
//!
//! The extractor is a pure function over file text. It never touches the
//! filesystem; resolving relative targets is the walker's job.

use serde::Serialize;

use super::{CommentStripper, TokenKind, lex_line};

/// How an import target is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportKind {
    /// `./x.ext` or `../x.ext`, resolved against the importing file's directory.
    Relative,
    /// `/abs/x.ext`, used as-is.
    Absolute,
    /// `<channel>` lookup path; recorded, never resolved.
    External,
    /// Anything the scanner cannot resolve statically (function calls,
    /// conditionals, inline modules, extension-less paths).
    Dynamic,
}

impl ImportKind {
    /// Whether the walker follows imports of this kind.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Relative | Self::Absolute)
    }

    /// Short lowercase label used in reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Relative => "relative",
            Self::Absolute => "absolute",
            Self::External => "external",
            Self::Dynamic => "dynamic",
        }
    }
}

/// Which list an import was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListKind {
    /// `imports = [ ... ]`
    Imports,
    /// `modules = [ ... ]`, typically inside an orchestrator's system block.
    Modules,
}

impl ListKind {
    fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "imports" => Some(Self::Imports),
            "modules" => Some(Self::Modules),
            _ => None,
        }
    }
}

/// One import reference as written in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRef {
    /// The target text with surrounding quotes removed.
    pub target: String,
    /// Classification of `target`.
    pub kind: ImportKind,
    /// 1-based line where the reference starts.
    pub line: usize,
    /// The list the reference was found in.
    pub list: ListKind,
}

/// A line inside an import list that could not be tokenized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnparseableLine {
    /// 1-based line number.
    pub line: usize,
    /// Why the line was skipped.
    pub reason: String,
}

/// Everything the extractor found in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Import references in source order.
    pub imports: Vec<ImportRef>,
    /// Lines skipped because they could not be tokenized.
    pub unparseable: Vec<UnparseableLine>,
}

/// Parenthesised or braced expression being collected as one dynamic entry.
#[derive(Debug)]
struct PendingGroup {
    depth: usize,
    text: String,
    line: usize,
    /// Offset in the current line where the uncollected part begins.
    segment_start: usize,
}

#[derive(Debug)]
enum State {
    Outside,
    Keyword(ListKind),
    Assigned(ListKind),
    InList {
        list: ListKind,
        opened_at: usize,
        depth: usize,
        group: Option<PendingGroup>,
    },
}

/// Extracts import references for one file extension.
#[derive(Debug, Clone)]
pub struct ImportExtractor {
    suffix: String,
}

impl ImportExtractor {
    /// Create an extractor for files ending in `.{extension}`.
    #[must_use]
    pub fn new(extension: &str) -> Self {
        Self {
            suffix: format!(".{}", extension.trim_start_matches('.')),
        }
    }

    /// Classify one candidate list entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use confgraph::scan::{ImportExtractor, ImportKind};
    ///
    /// let x = ImportExtractor::new("nix");
    /// assert_eq!(x.classify("./hardware.nix"), ImportKind::Relative);
    /// assert_eq!(x.classify("/etc/nixos/extra.nix"), ImportKind::Absolute);
    /// assert_eq!(x.classify("<nixpkgs/nixos/modules/profiles/minimal.nix>"), ImportKind::External);
    /// assert_eq!(x.classify("./hardware"), ImportKind::Dynamic);
    /// assert_eq!(x.classify("./hosts/${host}.nix"), ImportKind::Dynamic);
    /// ```
    #[must_use]
    pub fn classify(&self, candidate: &str) -> ImportKind {
        let has_suffix = candidate.len() > self.suffix.len()
            && candidate.ends_with(&self.suffix)
            && !candidate.contains("${");
        if candidate.len() > 2 && candidate.starts_with('<') && candidate.ends_with('>') {
            ImportKind::External
        } else if (candidate.starts_with("./") || candidate.starts_with("../")) && has_suffix {
            ImportKind::Relative
        } else if candidate.starts_with('/') && has_suffix {
            ImportKind::Absolute
        } else {
            ImportKind::Dynamic
        }
    }

    /// Extract every import reference from `text`, in source order.
    #[must_use]
    pub fn extract(&self, text: &str) -> Extraction {
        let mut out = Extraction::default();
        let mut stripper = CommentStripper::new();
        let mut state = State::Outside;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let code = stripper.code(raw);
            let lexed = lex_line(&code);
            let started_in_list = matches!(state, State::InList { .. });

            for token in &lexed.tokens {
                state = self.step(
                    state,
                    token.kind.clone(),
                    token.start,
                    token.end,
                    &code,
                    line,
                    &mut out,
                );
            }

            if lexed.unterminated && (started_in_list || !matches!(state, State::Outside)) {
                out.unparseable.push(UnparseableLine {
                    line,
                    reason: format!("unterminated string: {}", raw.trim()),
                });
            }

            if let State::InList {
                group: Some(group), ..
            } = &mut state
            {
                if let Some(rest) = code.get(group.segment_start..) {
                    group.text.push_str(rest.trim());
                    group.text.push(' ');
                }
                group.segment_start = 0;
            }
        }

        if let State::InList {
            list,
            opened_at,
            group,
            ..
        } = state
        {
            if let Some(group) = group {
                out.imports.push(ImportRef {
                    target: group.text.trim().to_string(),
                    kind: ImportKind::Dynamic,
                    line: group.line,
                    list,
                });
            }
            out.unparseable.push(UnparseableLine {
                line: opened_at,
                reason: "import list is never closed".to_string(),
            });
        }

        out
    }

    #[allow(clippy::too_many_arguments)]
    fn step(
        &self,
        state: State,
        token: TokenKind,
        start: usize,
        end: usize,
        code: &str,
        line: usize,
        out: &mut Extraction,
    ) -> State {
        match state {
            State::Outside => keyword_state(&token).unwrap_or(State::Outside),
            State::Keyword(list) => match token {
                TokenKind::Assign => State::Assigned(list),
                other => keyword_state(&other).unwrap_or(State::Outside),
            },
            State::Assigned(list) => match token {
                TokenKind::ListOpen => State::InList {
                    list,
                    opened_at: line,
                    depth: 1,
                    group: None,
                },
                other => keyword_state(&other).unwrap_or(State::Outside),
            },
            State::InList {
                list,
                opened_at,
                depth,
                group: Some(mut group),
            } => {
                match token {
                    TokenKind::GroupOpen => group.depth += 1,
                    TokenKind::GroupClose => group.depth -= 1,
                    _ => {}
                }
                if group.depth > 0 {
                    return State::InList {
                        list,
                        opened_at,
                        depth,
                        group: Some(group),
                    };
                }
                if let Some(tail) = code.get(group.segment_start..end) {
                    group.text.push_str(tail.trim());
                }
                out.imports.push(ImportRef {
                    target: group.text.trim().to_string(),
                    kind: ImportKind::Dynamic,
                    line: group.line,
                    list,
                });
                State::InList {
                    list,
                    opened_at,
                    depth,
                    group: None,
                }
            }
            State::InList {
                list,
                opened_at,
                depth,
                group: None,
            } => {
                let mut depth = depth;
                let mut group = None;
                match token {
                    TokenKind::ListOpen => depth += 1,
                    TokenKind::ListClose => {
                        depth -= 1;
                        if depth == 0 {
                            return State::Outside;
                        }
                    }
                    TokenKind::GroupOpen => {
                        group = Some(PendingGroup {
                            depth: 1,
                            text: String::new(),
                            line,
                            segment_start: start,
                        });
                    }
                    TokenKind::GroupClose | TokenKind::Assign => {}
                    TokenKind::Str(target) | TokenKind::Word(target) => {
                        let target = target.trim();
                        if !target.is_empty() {
                            out.imports.push(ImportRef {
                                target: target.to_string(),
                                kind: self.classify(target),
                                line,
                                list,
                            });
                        }
                    }
                }
                State::InList {
                    list,
                    opened_at,
                    depth,
                    group,
                }
            }
        }
    }
}

fn keyword_state(token: &TokenKind) -> Option<State> {
    match token {
        TokenKind::Word(w) => ListKind::from_keyword(w).map(State::Keyword),
        _ => None,
    }
}
