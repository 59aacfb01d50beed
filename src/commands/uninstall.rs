//! Command: remove the links of an installed dotfiles template.
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use super::install::render_link_report;
use super::{CommandSetup, Terminal, ensure_complete, find};
use crate::cli::{GlobalOpts, UninstallOpts};
use crate::config::OutputFormat;
use crate::logging::{Log, Logger};
use crate::repository::RepositorySync;
use crate::tasks::{Context, uninstall_template};
use crate::templates::{Template, TemplateKind, discover_templates};

/// Run the uninstall command.
///
/// # Errors
///
/// Returns an error if the repository or template cannot be resolved, or if
/// any link could not be removed.
pub fn run(
    global: &GlobalOpts,
    opts: &UninstallOpts,
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

/// Remove the links of `template` that point into the repository.
///
/// # Errors
///
/// Returns an error if some links could not be removed.
pub fn execute(
    setup: &CommandSetup,
    ctx: &Context,
    template: &Template,
    repo_root: &Path,
    opts: &UninstallOpts,
    term: &mut Terminal<'_>,
) -> Result<()> {
    ctx.log
        .stage(&format!("Uninstalling dotfiles template: {}", template.name));
    let report = uninstall_template(ctx, template, repo_root, opts.dry_run)?;
    match setup.format {
        OutputFormat::Text => {
            let verb = if opts.dry_run { "Would remove" } else { "Removed" };
            term.print(&render_link_report(&report, verb))?;
        }
        OutputFormat::Json => term.json(&report)?,
    }
    ensure_complete(&report.template, "removal", report.failed_count())
}

#[cfg(all(test, unix))]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::commands::test_support::{Io, local_setup};
    use crate::logging::MemoryLog;
    use crate::tasks::{MaterializeOptions, install_template};

    #[test]
    fn keeps_user_files_and_reports_them() {
        let dir = tempfile::tempdir().unwrap();
        let repo = dir.path().join("repo");
        let home = dir.path().join("home");
        let vim = repo.join("dotfiles/vim");
        std::fs::create_dir_all(&vim).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        std::fs::write(vim.join(".vimrc"), "set number\n").unwrap();
        std::fs::write(vim.join(".gvimrc"), "set guifont\n").unwrap();

        let log = Arc::new(MemoryLog::new());
        let ctx = Context::new(Arc::clone(&log) as Arc<dyn Log>, home.clone());
        let templates = discover_templates(&repo, log.as_ref());
        let template = find(&templates, "vim", TemplateKind::Dotfiles, &*log).unwrap();
        install_template(&ctx, template, &repo, MaterializeOptions::default()).unwrap();
        std::fs::remove_file(home.join(".gvimrc")).unwrap();
        std::fs::write(home.join(".gvimrc"), "mine\n").unwrap();

        let setup = local_setup(&repo, &home, OutputFormat::Text);
        let mut io = Io::answering("");
        execute(
            &setup,
            &ctx,
            template,
            &repo,
            &UninstallOpts {
                name: "vim".to_string(),
                dry_run: false,
            },
            &mut io.terminal(),
        )
        .unwrap();

        assert!(!home.join(".vimrc").exists());
        assert_eq!(std::fs::read_to_string(home.join(".gvimrc")).unwrap(), "mine\n");
        let output = io.output();
        assert!(output.contains("(not_symlink)"), "{output}");
        assert!(output.ends_with("Removed 1/2 links for 'vim'\n"), "{output}");
    }
}
