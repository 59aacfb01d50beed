//! Command: clone or update the local repository cache.
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::{CommandSetup, Terminal};
use crate::cli::{GlobalOpts, SyncOpts};
use crate::config::OutputFormat;
use crate::logging::{Log, Logger};
use crate::repository::{RepositorySync, SyncChange};
use crate::templates::{TemplateKind, discover_templates};

/// Result of a sync, as printed by `sync --format json`.
#[derive(Debug, Serialize)]
pub struct SyncSummary {
    /// Repository URL.
    pub url: String,
    /// Branch that was synced.
    pub branch: String,
    /// Working tree used for templates.
    pub path: PathBuf,
    /// What the sync did.
    pub change: SyncChange,
    /// Number of dotfiles templates found after syncing.
    pub dotfiles: usize,
    /// Number of project templates found after syncing.
    pub projects: usize,
}

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if no repository is configured or the Git operation fails.
pub fn run(
    global: &GlobalOpts,
    opts: &SyncOpts,
    log: &Arc<Logger>,
    sync: &dyn RepositorySync,
    term: &mut Terminal<'_>,
) -> Result<()> {
    let setup = CommandSetup::init(global)?;
    let summary = execute(&setup, opts, log.as_ref(), sync)?;
    match setup.format {
        OutputFormat::Text => term.print(&render_text(&summary, setup.verbose)),
        OutputFormat::Json => term.json(&summary),
    }
}

/// Sync and count the templates in the result.
///
/// # Errors
///
/// Returns an error if no repository is configured or the Git operation fails.
pub fn execute(
    setup: &CommandSetup,
    opts: &SyncOpts,
    log: &dyn Log,
    sync: &dyn RepositorySync,
) -> Result<SyncSummary> {
    let url = setup.config.repo_url()?.to_string();
    log.stage(&format!("Syncing with repository: {url}"));
    let report = setup.sync_now(sync, opts.branch.as_deref(), opts.force, log)?;
    let branch = opts
        .branch
        .as_deref()
        .unwrap_or(&setup.config.repository.branch)
        .trim()
        .to_string();

    let templates = discover_templates(&report.path, log);
    let count = |kind| templates.iter().filter(|t| t.kind == kind).count();
    Ok(SyncSummary {
        url,
        branch,
        dotfiles: count(TemplateKind::Dotfiles),
        projects: count(TemplateKind::Project),
        path: report.path,
        change: report.change,
    })
}

/// Human-readable sync result.
#[must_use]
pub fn render_text(summary: &SyncSummary, verbose: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Repository: {}", summary.url);
    let _ = writeln!(out, "Branch: {}", summary.branch);
    let _ = writeln!(out, "Cache directory: {}", summary.path.display());
    let status = match summary.change {
        SyncChange::Cloned => "Repository cloned",
        SyncChange::UpToDate => "Repository already up to date",
        SyncChange::Updated => "Repository updated",
        SyncChange::Reset => "Repository reset to origin",
        SyncChange::Local => "Using local repository in place",
    };
    let _ = writeln!(out, "✓ {status}");
    if verbose {
        let _ = writeln!(
            out,
            "Found {} templates ({} dotfiles, {} projects)",
            summary.dotfiles + summary.projects,
            summary.dotfiles,
            summary.projects
        );
    }
    out
}
