//! Subcommand implementations and the setup they share.

pub mod analyze;
pub mod chain;
pub mod conflicts;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::config::{Overrides, Settings, validation};
use crate::error::ConfigError;
use crate::graph::{AnalysisState, DiskSource, FileSource, Walker};
use crate::logging::Log;
use crate::report;
use crate::scan::{ImportExtractor, KeyScanner};

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates root resolution, settings loading and validation so that
/// each command does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct AnalysisSetup {
    /// Canonical analysis root.
    pub root: PathBuf,
    /// Settings after command-line overrides.
    pub settings: Settings,
    /// Entry files resolved against `root`.
    pub entries: Vec<PathBuf>,
}

impl AnalysisSetup {
    /// Resolve the root, load settings, apply overrides, and resolve entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory does not exist or the settings
    /// file cannot be read or parsed.
    pub fn init(
        global: &GlobalOpts,
        entries: &[PathBuf],
        chain_log: Option<PathBuf>,
        log: &dyn Log,
    ) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("root: {}", root.display()));

        log.stage("Loading settings");
        let settings = Settings::load(&root, global.config.as_deref())
            .context("loading analyzer settings")?
            .with_overrides(Overrides {
                extension: global.extension.clone(),
                max_depth: global.max_depth,
                chain_log,
            });
        log.debug(&format!("extension: .{}", settings.extension));
        log.debug(&format!("{} keys", settings.keys.len()));
        log.debug(&format!(
            "limits: depth {}, nodes {}",
            settings.max_depth, settings.max_nodes
        ));

        let warnings = validation::validate_all(&settings);
        if !warnings.is_empty() {
            log.warn(&format!("found {} settings warning(s):", warnings.len()));
            for warning in &warnings {
                log.warn(&format!(
                    "  {} [{}]: {}",
                    warning.source, warning.item, warning.message
                ));
            }
        }

        let entries = settings.entry_paths(&root, entries);
        log.info(&format!(
            "entries: {}",
            entries
                .iter()
                .map(|e| report::display_path(&root, e))
                .collect::<Vec<_>>()
                .join(", ")
        ));

        Ok(Self {
            root,
            settings,
            entries,
        })
    }

    /// Walk the tree from the entries on disk.
    #[must_use]
    pub fn analyze(&self, log: &dyn Log) -> AnalysisState {
        self.analyze_with(&DiskSource, log)
    }

    /// Walk the tree through `source`.
    #[must_use]
    pub fn analyze_with(&self, source: &dyn FileSource, log: &dyn Log) -> AnalysisState {
        log.stage("Walking imports");
        let state = Walker::new(
            source,
            ImportExtractor::new(&self.settings.extension),
            KeyScanner::new(&self.settings.keys),
            log,
        )
        .with_limits(self.settings.limits())
        .analyze(&self.entries);
        log.info(&format!(
            "{} file(s) analyzed, {} issue(s)",
            state.nodes().len(),
            state.issues().len()
        ));
        state
    }

    /// Chain log destination: the configured path, or the cache directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and no cache directory is
    /// available.
    pub fn chain_log_path(&self) -> Result<PathBuf> {
        match &self.settings.chain_log {
            Some(path) => Ok(path.clone()),
            None => Ok(report::default_chain_path()?),
        }
    }
}

/// Determine the analysis root: `--root` or the current directory.
///
/// The result is canonical so that node paths can be shown relative to it.
///
/// # Errors
///
/// Returns an error if the directory does not exist.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let root = match &global.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("reading current directory")?,
    };
    canonical_dir(&root).ok_or_else(|| ConfigError::RootNotFound(root).into())
}

fn canonical_dir(path: &Path) -> Option<PathBuf> {
    dunce::canonicalize(path).ok().filter(|p| p.is_dir())
}
