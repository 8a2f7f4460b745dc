//! Command: full analysis with tree, summary and chain log.
use anyhow::{Context as _, Result};
use std::io::Write;

use crate::cli::{AnalyzeOpts, Format, GlobalOpts};
use crate::graph::{AnalysisState, IssueKind};
use crate::logging::Logger;
use crate::report::{self, Report};

/// Run the analyze command, writing the report to `out`.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, output or the chain log
/// cannot be written, or `--strict` is set and a dangling reference or cycle
/// was found.
pub fn run(
    global: &GlobalOpts,
    opts: &AnalyzeOpts,
    log: &Logger,
    out: &mut dyn Write,
) -> Result<()> {
    let setup = super::AnalysisSetup::init(global, &opts.entries, opts.chain_log.clone(), log)?;
    let state = setup.analyze(log);
    let conflicts = state.conflicts();

    match opts.format {
        Format::Text => {
            log.stage("Dependency tree");
            write!(out, "{}", report::render_tree(&state, &setup.root))?;
            log.stage("Summary");
            write!(
                out,
                "{}",
                report::render_summary(&state, &conflicts, &setup.root)
            )?;
        }
        Format::Json => {
            let json = Report::new(&setup.root, &setup.entries, &state, &conflicts).to_json()?;
            writeln!(out, "{json}")?;
        }
    }
    out.flush()?;

    if opts.no_chain_log {
        log.debug("chain log disabled");
    } else {
        let path = setup.chain_log_path()?;
        report::write_chain(&path, &state)
            .with_context(|| format!("writing chain log for {}", setup.root.display()))?;
        log.info(&format!("chain log: {}", path.display()));
    }

    log.print_footer();

    if opts.strict {
        let failures = strict_failures(&state);
        if failures > 0 {
            anyhow::bail!("{failures} dangling reference(s) or cycle(s) found");
        }
    }
    Ok(())
}

/// Issues that fail an `--strict` run.
fn strict_failures(state: &AnalysisState) -> usize {
    state.count(IssueKind::DanglingReference) + state.count(IssueKind::CycleDetected)
}
