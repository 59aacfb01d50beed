//! Install script execution.
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::{Command, Output};

/// Shell used to run install scripts.
const SHELL: &str = "sh";

/// Result of a command execution.
#[derive(Debug)]
pub struct ExecResult {
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// Whether the process exited successfully.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Execute a command and return the result, bailing on non-zero exit.
fn execute_checked(mut cmd: Command, label: &str) -> Result<ExecResult> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to execute: {label}"))?;
    let result = ExecResult::from(output);
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

/// Run an install script with `sh` from inside `dir`.
///
/// `DOTFORGE_TEMPLATE_DIR` is exported so scripts applied to a target
/// directory can still reach their own template files.
///
/// # Errors
///
/// Returns an error if the shell cannot be started or the script exits
/// non-zero.
pub fn run_script(script: &Path, dir: &Path, template_dir: &Path) -> Result<ExecResult> {
    let mut cmd = Command::new(SHELL);
    cmd.arg(script)
        .current_dir(dir)
        .env("DOTFORGE_TEMPLATE_DIR", template_dir);
    execute_checked(cmd, &format!("{} in {}", script.display(), dir.display()))
}
