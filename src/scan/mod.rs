//! Line-oriented lexing shared by the import extractor and the key scanner.
//!
//! Configuration files are scanned one line at a time. The only state that
//! crosses a line boundary is whether a `/* ... */` block comment is still
//! open; everything else (string literals, separators) is line-local. The
//! stateful parts of each extractor live in their own modules and consume the
//! [`Token`]s produced here.

pub mod imports;
pub mod keys;

use std::iter::Peekable;
use std::str::CharIndices;

pub use imports::{
    Extraction, ImportExtractor, ImportKind, ImportRef, ListKind, UnparseableLine,
};
pub use keys::{KeyOccurrence, KeyScanner, OccurrenceKind};

/// Removes comments from source lines while respecting string literals.
#[derive(Debug, Default)]
pub struct CommentStripper {
    in_block: bool,
}

impl CommentStripper {
    /// Create a stripper positioned outside any comment.
    #[must_use]
    pub const fn new() -> Self {
        Self { in_block: false }
    }

    /// Return the code portion of `line`: `#` line comments and
    /// `/* ... */` block comments are removed, string contents are kept.
    pub fn code(&mut self, line: &str) -> String {
        let mut out = String::with_capacity(line.len());
        let mut chars = line.chars().peekable();
        let mut in_string = false;

        while let Some(c) = chars.next() {
            if self.in_block {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_block = false;
                    out.push(' ');
                }
                continue;
            }
            if in_string {
                out.push(c);
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        out.push(escaped);
                    }
                } else if c == '"' {
                    in_string = false;
                }
                continue;
            }
            match c {
                '"' => {
                    in_string = true;
                    out.push(c);
                }
                '#' => break,
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.in_block = true;
                }
                _ => out.push(c),
            }
        }
        out
    }
}

/// A lexical token with its byte span in the comment-stripped line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

/// Token categories recognized by [`lex_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `[`
    ListOpen,
    /// `]`
    ListClose,
    /// `(` or `{`
    GroupOpen,
    /// `)` or `}`
    GroupClose,
    /// `=`
    Assign,
    /// A double-quoted string; the payload excludes the quotes.
    Str(String),
    /// Any other run of non-whitespace, non-structural characters.
    Word(String),
}

/// Result of lexing one line of code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexedLine {
    /// Tokens in source order.
    pub tokens: Vec<Token>,
    /// A string literal was still open at the end of the line; tokens after
    /// its opening quote were dropped.
    pub unterminated: bool,
}

/// Split one comment-free line into tokens.
///
/// `,` and `;` only separate tokens; they never appear in the output. A
/// `${ ... }` interpolation inside a word stays part of that word.
#[must_use]
pub fn lex_line(code: &str) -> LexedLine {
    let mut out = LexedLine::default();
    let mut word_start: Option<usize> = None;
    let mut iter = code.char_indices().peekable();

    let flush = |out: &mut LexedLine, word_start: &mut Option<usize>, end: usize| {
        if let Some(start) = word_start.take()
            && let Some(text) = code.get(start..end)
        {
            out.tokens.push(Token {
                kind: TokenKind::Word(text.to_string()),
                start,
                end,
            });
        }
    };

    while let Some((i, c)) = iter.next() {
        if c == '{'
            && word_start.is_some()
            && code.get(..i).is_some_and(|s| s.ends_with('$'))
        {
            skip_interpolation(&mut iter);
            continue;
        }
        let single = match c {
            '[' => Some(TokenKind::ListOpen),
            ']' => Some(TokenKind::ListClose),
            '(' | '{' => Some(TokenKind::GroupOpen),
            ')' | '}' => Some(TokenKind::GroupClose),
            '=' => Some(TokenKind::Assign),
            _ => None,
        };
        if let Some(kind) = single {
            flush(&mut out, &mut word_start, i);
            out.tokens.push(Token {
                kind,
                start: i,
                end: i + c.len_utf8(),
            });
            continue;
        }
        if c.is_whitespace() || c == ',' || c == ';' {
            flush(&mut out, &mut word_start, i);
            continue;
        }
        if c == '"' && word_start.is_none() {
            let mut payload = String::new();
            let mut closed_at = None;
            while let Some((j, s)) = iter.next() {
                match s {
                    '\\' => {
                        if let Some((_, escaped)) = iter.next() {
                            payload.push(escaped);
                        }
                    }
                    '"' => {
                        closed_at = Some(j + 1);
                        break;
                    }
                    _ => payload.push(s),
                }
            }
            if let Some(end) = closed_at {
                out.tokens.push(Token {
                    kind: TokenKind::Str(payload),
                    start: i,
                    end,
                });
            } else {
                out.unterminated = true;
                return out;
            }
            continue;
        }
        if word_start.is_none() {
            word_start = Some(i);
        }
    }
    flush(&mut out, &mut word_start, code.len());
    out
}

/// Consume an interpolation body up to its closing brace.
fn skip_interpolation(iter: &mut Peekable<CharIndices<'_>>) {
    let mut depth = 1usize;
    for (_, c) in iter.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
            _ => {}
        }
    }
}

/// Iterate the characters of `code` that are outside string literals,
/// with their byte offsets.
pub(crate) fn outside_strings(code: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut in_string = false;
    let mut escaped = false;
    code.char_indices().filter(move |&(_, c)| {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            false
        } else if c == '"' {
            in_string = true;
            false
        } else {
            true
        }
    })
}
