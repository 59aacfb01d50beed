//! Command: print version information.
use anyhow::Result;

use super::Terminal;
use crate::cli::VERSION;

/// Print the dotforge version.
///
/// # Errors
///
/// Returns an error if stdout is closed.
pub fn run(term: &mut Terminal<'_>) -> Result<()> {
    term.print(&format!("dotforge {VERSION}\n"))
}
