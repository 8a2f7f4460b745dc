//! Structured console logger backed by `tracing`.
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::subscriber::{ISSUE_TARGET, STAGE_TARGET};
use super::types::Log;
use super::utils::log_file_path;
use crate::graph::Issue;

/// Implement the methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that tallies issues and warnings.
///
/// All messages are written to a persistent log file at
/// `$XDG_CACHE_HOME/confgraph/<command>.log` (default `~/.cache/confgraph/<command>.log`)
/// with timestamps and ANSI codes stripped, regardless of the verbose flag.
#[derive(Debug)]
pub struct Logger {
    log_file: Option<PathBuf>,
    warnings: AtomicUsize,
    issues: AtomicUsize,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display at the end of a run. The file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber);
    /// this constructor does not write to it.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger that reports `log_file` as its persistent log.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            log_file,
            warnings: AtomicUsize::new(0),
            issues: AtomicUsize::new(0),
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Report a traversal issue.
    pub fn issue(&self, issue: &Issue) {
        self.issues.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(target: ISSUE_TARGET, kind = issue.kind.label(), "{issue}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file via the [`FileLayer`](super::subscriber::FileLayer)).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Number of warnings logged so far.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// Number of traversal issues reported so far.
    #[must_use]
    pub fn issue_count(&self) -> usize {
        self.issues.load(Ordering::Relaxed)
    }

    /// Print the issue and warning tallies and the log file location.
    pub fn print_footer(&self) {
        let issues = self.issue_count();
        let warnings = self.warning_count();
        if issues > 0 || warnings > 0 {
            self.info(&format!(
                "\x1b[33m{issues} issue(s)\x1b[0m, \x1b[33m{warnings} warning(s)\x1b[0m"
            ));
        }
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn);

    fn issue(&self, issue: &Issue) {
        self.issue(issue);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::graph::IssueKind;
    use crate::logging::isolated_logger;
    use std::fs;

    fn dangling(line: usize) -> Issue {
        Issue {
            kind: IssueKind::DanglingReference,
            path: PathBuf::from("/cfg/missing.nix"),
            line: Some(line),
            detail: "imported from /cfg/root.nix".to_string(),
        }
    }

    fn file_contents(log: &Logger) -> String {
        fs::read_to_string(log.log_path().expect("log path")).unwrap()
    }

    #[test]
    fn logger_starts_with_zero_counts() {
        let (log, _tmp, _guard) = isolated_logger();
        assert_eq!(log.warning_count(), 0);
        assert_eq!(log.issue_count(), 0);
    }

    #[test]
    fn issues_and_warnings_are_counted_apart() {
        let (log, _tmp, _guard) = isolated_logger();
        log.warn("one");
        log.issue(&dangling(3));
        log.issue(&dangling(4));
        log.info("not counted");
        assert_eq!(log.warning_count(), 1);
        assert_eq!(log.issue_count(), 2);
    }

    #[test]
    fn debug_always_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        let marker = format!("debug-marker-{}", std::process::id());
        log.debug(&marker);
        assert!(
            file_contents(&log).contains(&marker),
            "debug messages should always appear in the log file"
        );
    }

    #[test]
    fn warn_written_to_file() {
        let (log, _tmp, _guard) = isolated_logger();
        log.warn("warn-marker");
        assert!(file_contents(&log).contains("[warn] warn-marker"));
    }

    #[test]
    fn issue_written_to_file_with_location() {
        let (log, _tmp, _guard) = isolated_logger();
        log.issue(&dangling(7));
        assert!(
            file_contents(&log).contains(
                "[issue] dangling reference: /cfg/missing.nix:7 (imported from /cfg/root.nix)"
            )
        );
    }

    #[test]
    fn stage_written_to_file_with_arrow() {
        let (log, _tmp, _guard) = isolated_logger();
        log.stage("stage-marker");
        assert!(file_contents(&log).contains("==> stage-marker"));
    }

    #[test]
    fn footer_reports_issue_tally() {
        let (log, _tmp, _guard) = isolated_logger();
        log.issue(&dangling(1));
        log.print_footer();
        let contents = file_contents(&log);
        assert!(contents.contains("1 issue(s), 0 warning(s)"));
        assert!(contents.contains("log: "));
        assert!(!contents.contains('\x1b'), "file log must not contain ANSI");
    }

    #[test]
    fn quiet_run_has_no_tally() {
        let (log, _tmp, _guard) = isolated_logger();
        log.print_footer();
        assert!(!file_contents(&log).contains("issue(s)"));
    }

    #[test]
    fn log_trait_delegates_to_logger() {
        let (log, _tmp, _guard) = isolated_logger();
        let log_ref: &dyn Log = &log;
        log_ref.warn("via-trait");
        log_ref.issue(&dangling(2));
        assert_eq!(log.warning_count(), 1);
        assert_eq!(log.issue_count(), 1);
    }
}
