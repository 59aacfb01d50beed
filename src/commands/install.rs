//! Command: symlink a dotfiles template into the home directory.
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use super::{
    CommandSetup, ScriptPolicy, Terminal, ensure_complete, find, outcome_marker,
    run_install_script,
};
use crate::cli::{GlobalOpts, InstallOpts};
use crate::config::OutputFormat;
use crate::logging::{Log, Logger};
use crate::repository::RepositorySync;
use crate::tasks::{Context, LinkReport, MaterializeOptions, install_template};
use crate::templates::{Template, TemplateKind, discover_templates};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if the repository or template cannot be resolved, or if
/// any link could not be created.
pub fn run(
    global: &GlobalOpts,
    opts: &InstallOpts,
    log: &Arc<Logger>,
    sync: &dyn RepositorySync,
    term: &mut Terminal<'_>,
) -> Result<()> {
    let setup = CommandSetup::init(global)?;
    let root = setup.repository(sync, log.as_ref())?;
    let templates = discover_templates(&root, log.as_ref());
    let template = find(&templates, &opts.name, TemplateKind::Dotfiles, log.as_ref())?;
    let ctx = setup.context(Arc::clone(log) as Arc<dyn Log>)?;

    let result = execute(&setup, &ctx, template, &root, opts, term);
    log.print_summary();
    result
}

/// Install `template` and print the per-link report.
///
/// # Errors
///
/// Returns an error if the template is not installable or some links failed.
pub fn execute(
    setup: &CommandSetup,
    ctx: &Context,
    template: &Template,
    repo_root: &Path,
    opts: &InstallOpts,
    term: &mut Terminal<'_>,
) -> Result<()> {
    ctx.log
        .stage(&format!("Installing dotfiles template: {}", template.name));
    let report = install_template(
        ctx,
        template,
        repo_root,
        MaterializeOptions {
            force: opts.force,
            dry_run: opts.dry_run,
        },
    )?;

    match setup.format {
        OutputFormat::Text => {
            let verb = if opts.dry_run { "Would link" } else { "Linked" };
            term.print(&render_link_report(&report, verb))?;
        }
        OutputFormat::Json => term.json(&report)?,
    }

    if report.success() {
        let policy = ScriptPolicy {
            skip: opts.no_script,
            dry_run: opts.dry_run,
            prompt: setup.prompts_for_scripts(),
        };
        run_install_script(template, &template.root_path, policy, ctx.log.as_ref(), term)?;
    }
    ensure_complete(&report.template, "installation", report.failed_count())
}

/// Per-link lines followed by a `<verb> done/total` footer.
#[must_use]
pub fn render_link_report(report: &LinkReport, verb: &str) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let _ = write!(
            out,
            "  {} {} -> {}",
            outcome_marker(&entry.outcome),
            entry.link.target.display(),
            entry.link.source.display()
        );
        if let Some(reason) = entry.outcome.reason() {
            let _ = write!(out, " ({reason})");
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{verb} {}/{} links for '{}'",
        report.completed().len(),
        report.entries.len(),
        report.template
    );
    out
}
