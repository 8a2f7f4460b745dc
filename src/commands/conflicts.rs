//! Command: report keys defined in more than one file.
use anyhow::Result;
use std::io::Write;

use crate::cli::{ConflictsOpts, GlobalOpts};
use crate::logging::Logger;
use crate::report;

/// Run the conflicts command, writing the summary to `out`.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, output cannot be written,
/// or `--strict` is set and at least one conflict was found.
pub fn run(
    global: &GlobalOpts,
    opts: &ConflictsOpts,
    log: &Logger,
    out: &mut dyn Write,
) -> Result<()> {
    let setup = super::AnalysisSetup::init(global, &opts.entries, None, log)?;
    let state = setup.analyze(log);
    let conflicts = state.conflicts();

    log.stage("Summary");
    write!(
        out,
        "{}",
        report::render_summary(&state, &conflicts, &setup.root)
    )?;
    out.flush()?;

    for record in &conflicts {
        log.warn(&format!(
            "conflict: {}",
            report::summary::conflict_line(record, &setup.root)
        ));
    }
    log.print_footer();

    if opts.strict && !conflicts.is_empty() {
        anyhow::bail!("{} conflicting key(s) found", conflicts.len());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};

    fn setup_tree(second: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("root.nix"),
            "{\n  imports = [ ./web.nix ];\n  services.nginx.enable = true;\n}\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("web.nix"), second).unwrap();
        dir
    }

    fn run_in(dir: &Path, strict: bool) -> (Result<()>, String) {
        let global = GlobalOpts {
            root: Some(dir.to_path_buf()),
            ..GlobalOpts::default()
        };
        let opts = ConflictsOpts {
            entries: vec![PathBuf::from("root.nix")],
            strict,
        };
        let mut out = Vec::new();
        let result = run(&global, &opts, &Logger::with_log_file(None), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn reports_conflict_across_files() {
        let dir = setup_tree("{\n  services.nginx.package = pkgs.angie;\n}\n");
        let (result, text) = run_in(dir.path(), false);
        assert!(result.is_ok());
        assert!(text.contains(
            "services.nginx: root.nix:3 (enabled), web.nix:2 (package-assignment)"
        ));
    }

    #[test]
    fn strict_fails_when_conflicts_exist() {
        let dir = setup_tree("{\n  services.nginx.package = pkgs.angie;\n}\n");
        let (result, _) = run_in(dir.path(), true);
        assert!(result.unwrap_err().to_string().contains("1 conflicting key(s)"));
    }

    #[test]
    fn strict_passes_without_conflicts() {
        let dir = setup_tree("{\n  services.openssh.enable = true;\n}\n");
        let (result, text) = run_in(dir.path(), true);
        assert!(result.is_ok());
        assert!(text.contains("Conflicts:           0"));
    }
}
