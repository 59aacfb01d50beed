//! Command: show link status of dotfiles templates.
use std::fmt::Write as _;
use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use super::{CommandSetup, Terminal, find};
use crate::cli::{GlobalOpts, StatusOpts};
use crate::config::OutputFormat;
use crate::logging::{Log, Logger};
use crate::resources::symlink::LinkStatus;
use crate::tasks::{Context, TemplateStatus, template_status};
use crate::templates::{Template, TemplateKind, discover_templates};

/// JSON document printed by `status --format json`.
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    /// One entry per dotfiles template.
    pub templates: Vec<TemplateStatus>,
}

/// Run the status command.
///
/// Reads the repository cache as it is; it never syncs.
///
/// # Errors
///
/// Returns an error if the repository has not been synced or the named
/// template does not exist.
pub fn run(
    global: &GlobalOpts,
    opts: &StatusOpts,
    log: &Arc<Logger>,
    term: &mut Terminal<'_>,
) -> Result<()> {
    let setup = CommandSetup::init(global)?;
    let root = setup.cached_repository()?;
    let templates = discover_templates(&root, log.as_ref());
    let ctx = setup.context(Arc::clone(log) as Arc<dyn Log>)?;
    let statuses = collect(&ctx, &templates, &root, opts)?;

    match setup.format {
        OutputFormat::Text => term.print(&render_text(&statuses, setup.verbose)),
        OutputFormat::Json => term.json(&StatusOutput {
            templates: statuses,
        }),
    }
}

/// Status of every dotfiles template, or only the one named by `--template`.
///
/// # Errors
///
/// Returns an error if `--template` names no dotfiles template.
pub fn collect(
    ctx: &Context,
    templates: &[Template],
    repo_root: &std::path::Path,
    opts: &StatusOpts,
) -> Result<Vec<TemplateStatus>> {
    let selected: Vec<&Template> = match &opts.template {
        Some(name) => vec![find(templates, name, TemplateKind::Dotfiles, ctx.log.as_ref())?],
        None => templates
            .iter()
            .filter(|t| t.kind == TemplateKind::Dotfiles)
            .collect(),
    };
    selected
        .into_iter()
        .map(|t| Ok(template_status(ctx, t, repo_root)?))
        .collect()
}

/// Human-readable status report.
///
/// Per-link detail is shown for templates that are not fully installed, or
/// for all templates when `verbose`.
#[must_use]
pub fn render_text(statuses: &[TemplateStatus], verbose: bool) -> String {
    let mut out = String::new();
    if statuses.is_empty() {
        out.push_str("No dotfiles templates found\n");
        return out;
    }

    for status in statuses {
        let _ = writeln!(out, "{} - {}", status.name, status.description);
        let _ = writeln!(
            out,
            "  {}/{} links active",
            status.active_count(),
            status.total()
        );
        if verbose || !status.is_fully_installed() {
            for entry in &status.links {
                let target = entry.link.target.display();
                let _ = match &entry.status {
                    LinkStatus::Ok => writeln!(out, "    ✓ {target}"),
                    LinkStatus::WrongTarget { actual_source } => writeln!(
                        out,
                        "    ✗ {target} -> {} (expected: {})",
                        actual_source.display(),
                        entry.link.source.display()
                    ),
                    LinkStatus::NotSymlink => writeln!(out, "    ✗ {target} (not a symlink)"),
                    LinkStatus::Missing => writeln!(out, "    ○ {target} (missing)"),
                };
            }
        }
        out.push('\n');
    }

    let installed = statuses.iter().filter(|s| s.is_fully_installed()).count();
    let _ = writeln!(
        out,
        "Summary: {installed}/{} templates fully installed",
        statuses.len()
    );
    out
}
