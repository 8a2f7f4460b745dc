//! `confgraph` command-line entry point.

use anyhow::Result;
use clap::Parser;
use std::io;

use confgraph::cli::{Cli, Command};
use confgraph::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();
    let mut stdout = io::stdout().lock();

    match &args.command {
        Command::Version => commands::version::run(&mut stdout),
        Command::Completions(opts) => commands::version::completions(opts.shell, &mut stdout),
        Command::Analyze(opts) => {
            let log = init_logging(args.verbose, &args.command);
            commands::analyze::run(&args.global, opts, &log, &mut stdout)
        }
        Command::Conflicts(opts) => {
            let log = init_logging(args.verbose, &args.command);
            commands::conflicts::run(&args.global, opts, &log, &mut stdout)
        }
        Command::Chain(opts) => {
            let log = init_logging(args.verbose, &args.command);
            commands::chain::run(&args.global, opts, &log, &mut stdout)
        }
    }
}

/// Install the console and file subscriber for `command`.
fn init_logging(verbose: bool, command: &Command) -> logging::Logger {
    logging::init_subscriber(verbose, command.name());
    logging::Logger::new(command.name())
}
