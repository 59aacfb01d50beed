//! Command: generate shell completion scripts.
use anyhow::Result;
use clap::CommandFactory as _;

use super::Terminal;
use crate::cli::{Cli, CompletionsOpts};

/// Write the completion script for the requested shell.
///
/// # Errors
///
/// Returns an error if the script cannot be written.
pub fn run(opts: &CompletionsOpts, term: &mut Terminal<'_>) -> Result<()> {
    let mut script = Vec::new();
    clap_complete::generate(opts.shell, &mut Cli::command(), "dotforge", &mut script);
    term.print(&String::from_utf8_lossy(&script))
}
