// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed configuration tree and a fluent
// builder so each integration test can set up an isolated tree without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use confgraph::cli::GlobalOpts;
use confgraph::commands::AnalysisSetup;
use confgraph::graph::AnalysisState;
use confgraph::logging::NullLog;

/// Settings used by every tree unless a test overrides them: `.cfg` files,
/// no default entries, and the two keys the scenarios use.
pub const DEFAULT_SETTINGS: &str = "extension = \"cfg\"\n\
entries = [\"root.cfg\"]\n\
keys = [\"services.nginx\", \"services.openssh\"]\n";

/// An isolated configuration tree backed by a [`tempfile::TempDir`].
pub struct ConfigTree {
    /// Temporary directory holding the tree.
    pub root: tempfile::TempDir,
}

impl ConfigTree {
    /// Create an empty tree with [`DEFAULT_SETTINGS`].
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        std::fs::write(root.path().join("confgraph.toml"), DEFAULT_SETTINGS)
            .expect("write confgraph.toml");
        Self { root }
    }

    /// Path to the tree root.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Canonical root, as reports display paths relative to it.
    pub fn canonical_root(&self) -> PathBuf {
        dunce::canonicalize(self.root.path()).expect("canonicalize root")
    }

    /// Global options pointing at this tree.
    pub fn global(&self) -> GlobalOpts {
        GlobalOpts {
            root: Some(self.root.path().to_path_buf()),
            ..GlobalOpts::default()
        }
    }

    /// Run a full analysis from `entries` (configured entries when empty).
    pub fn analyze(&self, entries: &[&str]) -> AnalysisState {
        let entries: Vec<PathBuf> = entries.iter().map(PathBuf::from).collect();
        let setup =
            AnalysisSetup::init(&self.global(), &entries, None, &NullLog).expect("setup analysis");
        setup.analyze(&NullLog)
    }

    /// File names of the visited nodes in discovery order.
    pub fn discovery_order(state: &AnalysisState) -> Vec<String> {
        state
            .nodes()
            .iter()
            .map(|n| {
                n.path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }
}

/// Fluent builder for [`ConfigTree`].
pub struct ConfigTreeBuilder {
    tree: ConfigTree,
}

impl ConfigTreeBuilder {
    /// Begin building a new tree.
    pub fn new() -> Self {
        Self {
            tree: ConfigTree::new(),
        }
    }

    /// Write `content` to `relative`, creating parent directories.
    pub fn with_file(self, relative: &str, content: &str) -> Self {
        let path = self.tree.root.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, content).expect("write config file");
        self
    }

    /// Replace `confgraph.toml`.
    pub fn with_settings(self, content: &str) -> Self {
        std::fs::write(self.tree.root.path().join("confgraph.toml"), content)
            .expect("write confgraph.toml");
        self
    }

    /// Finalise and return the tree.
    pub fn build(self) -> ConfigTree {
        self.tree
    }
}

/// The end-to-end scenario: `root.cfg` imports `a.cfg` and `b.cfg`, both
/// import `common.cfg`, `a.cfg` enables nginx and `b.cfg` sets its package.
pub fn diamond_tree() -> ConfigTree {
    ConfigTreeBuilder::new()
        .with_file("root.cfg", "{\n  imports = [ ./a.cfg ./b.cfg ];\n}\n")
        .with_file(
            "a.cfg",
            "{\n  imports = [ ./common.cfg ];\n  services.nginx.enable = true;\n}\n",
        )
        .with_file(
            "b.cfg",
            "{\n  imports = [ ./common.cfg ];\n  services.nginx.package = pkgs.nginxQuic;\n}\n",
        )
        .with_file("common.cfg", "{\n  networking.hostName = \"box\";\n}\n")
        .build()
}
