//! Command: copy a project template into a directory.
use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{
    CommandSetup, ScriptPolicy, Terminal, ensure_complete, find, outcome_marker,
    run_install_script,
};
use crate::cli::{ApplyOpts, GlobalOpts};
use crate::config::OutputFormat;
use crate::error::MaterializeError;
use crate::logging::{Log, Logger};
use crate::repository::RepositorySync;
use crate::tasks::{ApplyReport, Context, MaterializeOptions, apply_template};
use crate::templates::{Template, TemplateKind, detect_conflicts, discover_templates};

/// Run the apply command.
///
/// # Errors
///
/// Returns an error if the repository or template cannot be resolved, the
/// user declines to overwrite conflicts, or any file could not be copied.
pub fn run(
    global: &GlobalOpts,
    opts: &ApplyOpts,
    log: &Arc<Logger>,
    sync: &dyn RepositorySync,
    term: &mut Terminal<'_>,
) -> Result<()> {
    let setup = CommandSetup::init(global)?;
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    let target_dir = opts.target.as_ref().map_or_else(|| cwd.clone(), |t| cwd.join(t));

    let root = setup.repository(sync, log.as_ref())?;
    let templates = discover_templates(&root, log.as_ref());
    let template = find(&templates, &opts.name, TemplateKind::Project, log.as_ref())?;
    let ctx = setup.context(Arc::clone(log) as Arc<dyn Log>)?;

    let result = execute(&setup, &ctx, template, &root, &target_dir, opts, term);
    log.print_summary();
    result
}

/// Check for conflicts, copy `template` into `target_dir` and print the report.
///
/// Conflicting files are listed first.  Outside a dry run the user must
/// agree to overwrite them unless `--force` or `--yes` is given.
///
/// # Errors
///
/// Returns [`MaterializeError::ConflictsDeclined`] if the user says no, and
/// [`MaterializeError::Incomplete`] if some files failed.
pub fn execute(
    setup: &CommandSetup,
    ctx: &Context,
    template: &Template,
    repo_root: &Path,
    target_dir: &Path,
    opts: &ApplyOpts,
    term: &mut Terminal<'_>,
) -> Result<()> {
    ctx.log.stage(&format!(
        "Applying project template: {} -> {}",
        template.name,
        target_dir.display()
    ));

    let mut force = opts.force;
    if !force {
        let conflicts = detect_conflicts(template, repo_root, target_dir, ctx.fs_ops.as_ref())?;
        if !conflicts.is_empty() {
            ctx.log
                .warn(&format!("{} file(s) already exist:", conflicts.len()));
            for (_, target) in &conflicts {
                ctx.log.warn(&format!("  {}", target.display()));
            }
            if !opts.dry_run {
                if opts.yes || term.confirm("Overwrite existing files?")? {
                    force = true;
                } else {
                    return Err(MaterializeError::ConflictsDeclined {
                        count: conflicts.len(),
                    }
                    .into());
                }
            }
        }
    }

    let report = apply_template(
        ctx,
        template,
        repo_root,
        target_dir,
        MaterializeOptions {
            force,
            dry_run: opts.dry_run,
        },
    )?;

    match setup.format {
        OutputFormat::Text => term.print(&render_text(&report, opts.dry_run))?,
        OutputFormat::Json => term.json(&report)?,
    }

    if report.success() {
        let policy = ScriptPolicy {
            skip: opts.no_script,
            dry_run: opts.dry_run,
            prompt: setup.prompts_for_scripts() && !opts.yes,
        };
        run_install_script(template, target_dir, policy, ctx.log.as_ref(), term)?;
    }
    ensure_complete(&report.template, "application", report.failed_count())
}

/// Per-file lines, relative to the target directory, and a footer.
#[must_use]
pub fn render_text(report: &ApplyReport, dry_run: bool) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let shown = entry
            .target
            .strip_prefix(&report.target_dir)
            .unwrap_or(&entry.target);
        let _ = write!(out, "  {} {}", outcome_marker(&entry.outcome), shown.display());
        if let Some(reason) = entry.outcome.reason() {
            let _ = write!(out, " ({reason})");
        }
        out.push('\n');
    }
    let verb = if dry_run { "Would copy" } else { "Copied" };
    let _ = writeln!(
        out,
        "{verb} {}/{} files into {}",
        report.completed().len(),
        report.entries.len(),
        report.target_dir.display()
    );
    out
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::commands::test_support::{Io, local_setup};
    use crate::error::{EXIT_CONFLICT, exit_code};
    use crate::logging::{Level, MemoryLog};
    use crate::tasks::{CopyStatus, copy_status};
    use std::path::PathBuf;

    struct Fixture {
        _dir: tempfile::TempDir,
        repo: PathBuf,
        target: PathBuf,
        log: Arc<MemoryLog>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let repo = dir.path().join("repo");
            let target = dir.path().join("app");
            let web = repo.join("projects/web");
            std::fs::create_dir_all(web.join("src")).unwrap();
            std::fs::write(web.join("index.html"), "<h1>hi</h1>\n").unwrap();
            std::fs::write(web.join("src/main.js"), "console.log(1)\n").unwrap();
            Self {
                _dir: dir,
                repo,
                target,
                log: Arc::new(MemoryLog::new()),
            }
        }

        fn apply(&self, opts: &ApplyOpts, answer: &'static str) -> (Result<()>, String) {
            let setup = local_setup(&self.repo, &self.target, OutputFormat::Text);
            let ctx = Context::new(Arc::clone(&self.log) as Arc<dyn Log>, self.target.clone());
            let templates = discover_templates(&self.repo, self.log.as_ref());
            let template = find(&templates, "web", TemplateKind::Project, &*self.log).unwrap();
            let mut io = Io::answering(answer);
            let result = execute(
                &setup,
                &ctx,
                template,
                &self.repo,
                &self.target,
                opts,
                &mut io.terminal(),
            );
            (result, io.output())
        }

        fn existing_index(&self) {
            std::fs::create_dir_all(&self.target).unwrap();
            std::fs::write(self.target.join("index.html"), "mine\n").unwrap();
        }

        fn index(&self) -> String {
            std::fs::read_to_string(self.target.join("index.html")).unwrap()
        }
    }

    fn opts() -> ApplyOpts {
        ApplyOpts {
            name: "web".to_string(),
            ..ApplyOpts::default()
        }
    }

    #[test]
    fn copies_into_new_directory() {
        let fx = Fixture::new();

        let (result, output) = fx.apply(&opts(), "");

        result.unwrap();
        assert_eq!(fx.index(), "<h1>hi</h1>\n");
        assert!(fx.target.join("src/main.js").is_file());
        assert!(output.contains("Copied 2/2 files"), "{output}");
        assert!(!output.contains("[y/N]"), "{output}");
    }

    #[test]
    fn conflict_declined_leaves_files_alone() {
        let fx = Fixture::new();
        fx.existing_index();

        let (result, output) = fx.apply(&opts(), "n\n");

        let err = result.unwrap_err();
        assert_eq!(exit_code(&err), EXIT_CONFLICT);
        assert!(output.contains("Overwrite existing files? [y/N]"), "{output}");
        assert_eq!(fx.index(), "mine\n");
        assert!(!fx.target.join("src/main.js").exists());
        assert!(
            fx.log.messages(Level::Warn)[0].starts_with("1 file(s) already exist"),
            "{:?}",
            fx.log.messages(Level::Warn)
        );
    }

    #[test]
    fn conflict_accepted_overwrites() {
        let fx = Fixture::new();
        fx.existing_index();

        let (result, _) = fx.apply(&opts(), "y\n");

        result.unwrap();
        assert_eq!(fx.index(), "<h1>hi</h1>\n");
    }

    #[test]
    fn yes_flag_skips_prompt() {
        let fx = Fixture::new();
        fx.existing_index();
        let o = ApplyOpts {
            yes: true,
            ..opts()
        };

        let (result, output) = fx.apply(&o, "");

        result.unwrap();
        assert!(!output.contains("[y/N]"), "{output}");
        assert_eq!(fx.index(), "<h1>hi</h1>\n");
    }

    #[test]
    fn dry_run_lists_conflicts_without_prompting() {
        let fx = Fixture::new();
        fx.existing_index();
        let o = ApplyOpts {
            dry_run: true,
            ..opts()
        };

        let (result, output) = fx.apply(&o, "");

        result.unwrap();
        assert!(!output.contains("[y/N]"), "{output}");
        assert!(output.contains("Would copy 2/2 files"), "{output}");
        assert_eq!(fx.index(), "mine\n");
        assert!(!fx.target.join("src").exists());
    }

    #[test]
    fn copied_files_verify() {
        let fx = Fixture::new();
        let ctx = Context::new(Arc::clone(&fx.log) as Arc<dyn Log>, fx.target.clone());
        let templates = discover_templates(&fx.repo, fx.log.as_ref());
        let template = find(&templates, "web", TemplateKind::Project, &*fx.log).unwrap();

        let report = apply_template(
            &ctx,
            template,
            &fx.repo,
            &fx.target,
            MaterializeOptions::default(),
        )
        .unwrap();

        assert_eq!(report.completed().len(), 2);
        for copy in report.completed() {
            assert_eq!(copy_status(copy), CopyStatus::Valid);
        }
    }
}
