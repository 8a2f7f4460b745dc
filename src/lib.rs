//! Declarative configuration dependency analyzer.
//!
//! Starting from one or more entry files, `confgraph` follows the file paths
//! listed in `imports = [ ... ]` and `modules = [ ... ]` declarations,
//! builds the dependency graph, and reports revisits, cycles, dangling
//! references and keys defined in more than one reachable file.
//!
//! The public API is organised into layers:
//!
//! - **[`scan`]**: line-oriented extraction of imports and key occurrences
//! - **[`graph`]**: the iterative walker and the state it fills
//! - **[`report`]**: tree, summary, chain log and JSON renderings
//! - **[`config`]**: settings file loading and validation
//! - **[`commands`]**: top-level subcommand orchestration (`analyze`, `conflicts`, `chain`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod graph;
pub mod logging;
pub mod report;
pub mod scan;
