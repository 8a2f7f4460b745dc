//! Cache locations, timestamps, and escape stripping for the run log.
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;

/// Timestamp prefix of each run-log line.
pub(super) const LINE_TIME: &str = "%H:%M:%S";
/// UTC timestamp written into log headers.
pub(crate) const ISO_UTC: &str = "%Y-%m-%dT%H:%M:%SZ";

/// The current UTC time rendered with a `chrono` format string.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}

/// Remove terminal escape sequences.
///
/// A CSI sequence (`ESC [` up to a final byte in `@`..=`~`) is dropped
/// whole. Any other escape drops itself and the character after it.
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(esc) = rest.find('\x1b') {
        let (plain, tail) = rest.split_at(esc);
        out.push_str(plain);
        let mut chars = tail.chars();
        chars.next();
        if chars.next() == Some('[') {
            let _final = chars.find(|c| ('@'..='~').contains(c));
        }
        rest = chars.as_str();
    }
    out.push_str(rest);
    out
}

fn non_empty(name: &str) -> Option<OsString> {
    env::var_os(name).filter(|v| !v.is_empty())
}

/// `$XDG_CACHE_HOME`, else `.cache` under the home directory, else `./.cache`.
fn cache_root() -> PathBuf {
    non_empty("XDG_CACHE_HOME").map_or_else(
        || {
            non_empty("HOME")
                .or_else(|| non_empty("USERPROFILE"))
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    )
}

/// `confgraph/` under the cache root, created on demand.
///
/// Holds the run logs and the default import-chain log.
pub(crate) fn cache_dir() -> Option<PathBuf> {
    let dir = cache_root().join("confgraph");
    fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Run log for `command`, e.g. `~/.cache/confgraph/analyze.log`.
pub(super) fn log_file_path(command: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(format!("{command}.log")))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colors() {
        assert_eq!(strip_ansi("\x1b[33missue\x1b[0m cycle"), "issue cycle");
        assert_eq!(strip_ansi("plain text"), "plain text");
        assert_eq!(strip_ansi(""), "");
    }

    #[test]
    fn strip_ansi_drops_whole_csi_sequences() {
        assert_eq!(strip_ansi("\x1b[2;5Htext"), "text");
        assert_eq!(strip_ansi("a\x1b[Kb"), "ab");
        assert_eq!(strip_ansi("\x1bMtext"), "text");
    }

    #[test]
    fn strip_ansi_keeps_multibyte_text() {
        assert_eq!(strip_ansi("\x1b[1mnaïve ✓\x1b[0m"), "naïve ✓");
    }

    #[test]
    fn strip_ansi_tolerates_truncated_sequence() {
        assert_eq!(strip_ansi("done\x1b[3"), "done");
        assert_eq!(strip_ansi("end\x1b"), "end");
    }

    #[test]
    fn utc_now_follows_format() {
        let line = utc_now(LINE_TIME);
        assert_eq!(line.len(), 8);
        assert_eq!(line.matches(':').count(), 2);
        let iso = utc_now(ISO_UTC);
        assert_eq!(iso.len(), 20);
        assert_eq!(&iso[10..11], "T");
        assert!(iso.ends_with('Z'));
    }
}
