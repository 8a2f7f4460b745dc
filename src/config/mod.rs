//! Analyzer settings.
//!
//! Settings come from `confgraph.toml` in the analysis root (or an explicit
//! `--config` path) and are then overridden by command-line flags. A missing
//! settings file yields [`Settings::default`].

pub mod toml_loader;
pub mod validation;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::graph::Limits;

/// File name looked up in the analysis root.
pub const SETTINGS_FILE: &str = "confgraph.toml";

/// Keys scanned when the settings file does not list any.
pub const DEFAULT_KEYS: &[&str] = &[
    "services.nginx",
    "services.openssh",
    "services.postgresql",
    "services.xserver",
    "services.pipewire",
    "services.printing",
    "networking.networkmanager",
    "virtualisation.docker",
];

/// Analyzer settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Extension of configuration files, without the dot.
    pub extension: String,
    /// Entry files relative to the root, used when none are given on the
    /// command line.
    pub entries: Vec<String>,
    /// Key vocabulary for conflict detection.
    pub keys: Vec<String>,
    /// Deepest import depth that is still read.
    pub max_depth: usize,
    /// Maximum number of files read in one run.
    pub max_nodes: usize,
    /// Chain log destination; `None` uses the cache directory.
    pub chain_log: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            extension: "nix".to_string(),
            entries: vec!["flake.nix".to_string(), "configuration.nix".to_string()],
            keys: DEFAULT_KEYS.iter().map(|k| (*k).to_string()).collect(),
            max_depth: limits.max_depth,
            max_nodes: limits.max_nodes,
            chain_log: None,
        }
    }
}

/// Command-line values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// `--extension`
    pub extension: Option<String>,
    /// `--max-depth`
    pub max_depth: Option<usize>,
    /// `--chain-log`
    pub chain_log: Option<PathBuf>,
}

impl Settings {
    /// Load settings for `root`.
    ///
    /// `explicit` names a settings file that must exist; otherwise
    /// `root/confgraph.toml` is used when present.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => toml_loader::load_required(path),
            None => toml_loader::load_config(&root.join(SETTINGS_FILE)),
        }
    }

    /// Apply command-line overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(extension) = overrides.extension {
            self.extension = extension;
        }
        if let Some(max_depth) = overrides.max_depth {
            self.max_depth = max_depth;
        }
        if let Some(chain_log) = overrides.chain_log {
            self.chain_log = Some(chain_log);
        }
        self
    }

    /// Traversal guards.
    #[must_use]
    pub const fn limits(&self) -> Limits {
        Limits {
            max_depth: self.max_depth,
            max_nodes: self.max_nodes,
        }
    }

    /// Resolve entry files against `root`: explicit `entries` win over the
    /// configured list.
    #[must_use]
    pub fn entry_paths(&self, root: &Path, entries: &[PathBuf]) -> Vec<PathBuf> {
        if entries.is_empty() {
            self.entries.iter().map(|e| root.join(e)).collect()
        } else {
            entries.iter().map(|e| root.join(e)).collect()
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.extension, "nix");
        assert_eq!(s.entries, vec!["flake.nix", "configuration.nix"]);
        assert!(s.keys.iter().any(|k| k == "services.nginx"));
        assert_eq!(s.limits(), Limits::default());
        assert!(s.chain_log.is_none());
    }

    #[test]
    fn missing_settings_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(dir.path(), None).unwrap(), Settings::default());
    }

    #[test]
    fn settings_file_in_root_is_read() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            "extension = \"cfg\"\nentries = [\"root.cfg\"]\nmax_depth = 3\n",
        )
        .unwrap();
        let s = Settings::load(dir.path(), None).unwrap();
        assert_eq!(s.extension, "cfg");
        assert_eq!(s.entries, vec!["root.cfg"]);
        assert_eq!(s.max_depth, 3);
        assert_eq!(s.max_nodes, 10_000);
    }

    #[test]
    fn explicit_settings_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(dir.path(), Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn overrides_take_precedence() {
        let s = Settings::default().with_overrides(Overrides {
            extension: Some("cfg".to_string()),
            max_depth: Some(2),
            chain_log: Some(PathBuf::from("/tmp/chain.log")),
        });
        assert_eq!(s.extension, "cfg");
        assert_eq!(s.max_depth, 2);
        assert_eq!(s.chain_log, Some(PathBuf::from("/tmp/chain.log")));
    }

    #[test]
    fn empty_overrides_change_nothing() {
        let s = Settings::default().with_overrides(Overrides::default());
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn explicit_entries_replace_configured_ones() {
        let s = Settings::default();
        let root = Path::new("/etc/nixos");
        assert_eq!(
            s.entry_paths(root, &[]),
            vec![root.join("flake.nix"), root.join("configuration.nix")]
        );
        assert_eq!(
            s.entry_paths(root, &[PathBuf::from("hosts/x.nix")]),
            vec![root.join("hosts/x.nix")]
        );
    }
}
