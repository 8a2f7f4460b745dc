//! Commands: version information and shell completions.
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

use crate::cli::Cli;

/// Version string, preferring the one embedded by the build script.
#[must_use]
pub fn version() -> &'static str {
    option_env!("CONFGRAPH_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the confgraph version.
///
/// # Errors
///
/// Returns an error if `out` cannot be written.
pub fn run(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "confgraph {}", version())?;
    Ok(())
}

/// Write a completion script for `shell`.
///
/// # Errors
///
/// Returns an error if `out` cannot be flushed.
pub fn completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "confgraph", out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn prints_name_and_version() {
        let mut out = Vec::new();
        run(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("confgraph "));
        assert!(text.trim_end().ends_with(version()));
    }

    #[test]
    fn bash_completions_mention_subcommands() {
        let mut out = Vec::new();
        completions(Shell::Bash, &mut out).unwrap();
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("confgraph"));
        assert!(script.contains("analyze"));
        assert!(script.contains("conflicts"));
    }
}
