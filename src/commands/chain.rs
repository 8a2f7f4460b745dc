//! Command: print reachable files in discovery order.
use anyhow::Result;
use std::io::Write;

use crate::cli::{ChainOpts, GlobalOpts};
use crate::logging::Logger;
use crate::report;

/// Run the chain command, writing the chain to `out`.
///
/// Output is byte-identical to the chain log `analyze` writes.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded or output cannot be written.
pub fn run(global: &GlobalOpts, opts: &ChainOpts, log: &Logger, out: &mut dyn Write) -> Result<()> {
    let setup = super::AnalysisSetup::init(global, &opts.entries, None, log)?;
    let state = setup.analyze(log);
    write!(out, "{}", report::format_chain(&state))?;
    out.flush()?;
    log.print_footer();
    Ok(())
}
