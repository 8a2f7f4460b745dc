//! Discovery-order chain log.
//!
//! The log lists one absolute path per visited file, in the order files were
//! first reached, under a two-line header. The header timestamp is the newest
//! modification time among the listed files, so re-running against an
//! unchanged tree produces identical bytes.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::error::ReportError;
use crate::graph::AnalysisState;

/// First header line.
pub const CHAIN_TITLE: &str = "# confgraph import chain";

/// File name of the chain log in the cache directory.
pub const CHAIN_FILE: &str = "import-chain.log";

/// Format the chain log.
#[must_use]
pub fn format_chain(state: &AnalysisState) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{CHAIN_TITLE}");
    let _ = writeln!(
        out,
        "# generated {}",
        state
            .newest_modification()
            .map_or_else(|| "-".to_string(), format_timestamp)
    );
    for node in state.nodes() {
        let _ = writeln!(out, "{}", node.path.display());
    }
    out
}

/// Write the chain log to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_chain(path: &Path, state: &AnalysisState) -> Result<(), ReportError> {
    let wrap = |source| ReportError::ChainLog {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(wrap)?;
    }
    fs::write(path, format_chain(state)).map_err(wrap)
}

/// `$XDG_CACHE_HOME/confgraph/import-chain.log`.
///
/// # Errors
///
/// Returns an error if no cache directory can be created.
pub fn default_chain_path() -> Result<PathBuf, ReportError> {
    crate::logging::cache_dir()
        .map(|dir| dir.join(CHAIN_FILE))
        .ok_or(ReportError::NoCacheDir)
}

fn format_timestamp(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format(crate::logging::ISO_UTC)
        .to_string()
}
