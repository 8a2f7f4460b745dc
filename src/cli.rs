//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Top-level CLI entry point for the configuration dependency analyzer.
#[derive(Parser, Debug)]
#[command(
    name = "confgraph",
    about = "Follow imports through a declarative configuration tree and report cycles, dangling references and key conflicts",
    version
)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Root directory of the configuration tree (defaults to the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Settings file (defaults to confgraph.toml in the root)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Extension of configuration files, without the dot
    #[arg(long, global = true)]
    pub extension: Option<String>,

    /// Deepest import depth to follow
    #[arg(long, global = true)]
    pub max_depth: Option<usize>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Walk the import graph and print the tree, summary and chain log
    Analyze(AnalyzeOpts),
    /// Report keys defined in more than one file
    Conflicts(ConflictsOpts),
    /// Print reachable files in discovery order
    Chain(ChainOpts),
    /// Generate shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

/// Output format of `analyze`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// Tree and summary for humans
    #[default]
    Text,
    /// Full analysis as JSON
    Json,
}

/// Options for the `analyze` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct AnalyzeOpts {
    /// Entry files relative to the root (defaults to the configured entries)
    pub entries: Vec<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Write the chain log here instead of the cache directory
    #[arg(long, conflicts_with = "no_chain_log")]
    pub chain_log: Option<PathBuf>,

    /// Do not write the chain log
    #[arg(long)]
    pub no_chain_log: bool,

    /// Exit with an error when any dangling reference or cycle is found
    #[arg(long)]
    pub strict: bool,
}

/// Options for the `conflicts` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ConflictsOpts {
    /// Entry files relative to the root (defaults to the configured entries)
    pub entries: Vec<PathBuf>,

    /// Exit with an error when any conflict is found
    #[arg(long)]
    pub strict: bool,
}

/// Options for the `chain` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct ChainOpts {
    /// Entry files relative to the root (defaults to the configured entries)
    pub entries: Vec<PathBuf>,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

impl Command {
    /// Name used for the per-command log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Analyze(_) => "analyze",
            Self::Conflicts(_) => "conflicts",
            Self::Chain(_) => "chain",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_analyze_defaults() {
        let cli = Cli::parse_from(["confgraph", "analyze"]);
        assert!(
            matches!(&cli.command, Command::Analyze(_)),
            "Expected Analyze command"
        );
        if let Command::Analyze(opts) = cli.command {
            assert!(opts.entries.is_empty());
            assert_eq!(opts.format, Format::Text);
            assert!(!opts.strict);
            assert!(!opts.no_chain_log);
            assert!(opts.chain_log.is_none());
        }
    }

    #[test]
    fn parse_analyze_entries_and_json() {
        let cli = Cli::parse_from([
            "confgraph",
            "analyze",
            "flake.nix",
            "hosts/laptop.nix",
            "--format",
            "json",
            "--strict",
        ]);
        assert!(
            matches!(&cli.command, Command::Analyze(_)),
            "Expected Analyze command"
        );
        if let Command::Analyze(opts) = cli.command {
            assert_eq!(
                opts.entries,
                vec![PathBuf::from("flake.nix"), PathBuf::from("hosts/laptop.nix")]
            );
            assert_eq!(opts.format, Format::Json);
            assert!(opts.strict);
        }
    }

    #[test]
    fn chain_log_and_no_chain_log_conflict() {
        let result = Cli::try_parse_from([
            "confgraph",
            "analyze",
            "--chain-log",
            "/tmp/c.log",
            "--no-chain-log",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "confgraph",
            "conflicts",
            "--root",
            "/etc/nixos",
            "--extension",
            "cfg",
            "--max-depth",
            "5",
            "--config",
            "/tmp/confgraph.toml",
        ]);
        assert_eq!(cli.global.root, Some(PathBuf::from("/etc/nixos")));
        assert_eq!(cli.global.extension.as_deref(), Some("cfg"));
        assert_eq!(cli.global.max_depth, Some(5));
        assert_eq!(cli.global.config, Some(PathBuf::from("/tmp/confgraph.toml")));
        assert!(matches!(cli.command, Command::Conflicts(_)));
    }

    #[test]
    fn parse_conflicts_strict() {
        let cli = Cli::parse_from(["confgraph", "conflicts", "--strict"]);
        assert!(matches!(cli.command, Command::Conflicts(ConflictsOpts { strict: true, .. })));
    }

    #[test]
    fn parse_chain() {
        let cli = Cli::parse_from(["confgraph", "chain", "configuration.nix"]);
        assert!(
            matches!(&cli.command, Command::Chain(_)),
            "Expected Chain command"
        );
        if let Command::Chain(opts) = cli.command {
            assert_eq!(opts.entries, vec![PathBuf::from("configuration.nix")]);
        }
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["confgraph", "completions", "bash"]);
        assert!(matches!(
            cli.command,
            Command::Completions(CompletionsOpts { shell: Shell::Bash })
        ));
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["confgraph", "version"]);
        assert!(matches!(cli.command, Command::Version));
        assert_eq!(cli.command.name(), "version");
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::parse_from(["confgraph", "-v", "analyze"]);
        assert!(cli.verbose);
    }

    #[test]
    fn invalid_format_is_rejected() {
        assert!(Cli::try_parse_from(["confgraph", "analyze", "--format", "xml"]).is_err());
    }
}
