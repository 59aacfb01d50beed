//! Top-level subcommand orchestration.
//!
//! Each subcommand has a `run` entry point taking the parsed options, the
//! CLI [`Logger`] and the injected [`RepositorySync`]; the work that does not
//! depend on process state lives in functions that tests can call with a
//! [`MemoryLog`](crate::logging::MemoryLog) and an in-memory [`Terminal`].
pub mod apply;
pub mod completions;
pub mod config;
pub mod install;
pub mod list;
pub mod status;
pub mod sync;
pub mod uninstall;
pub mod version;

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::config::{Config, OutputFormat, validation};
use crate::error::{MaterializeError, RepositoryError, TemplateError};
use crate::exec;
use crate::logging::{Log, Logger};
use crate::repository::{RepositorySync, SyncChange, SyncReport};
use crate::tasks::{Context, ItemOutcome};
use crate::templates::{Template, TemplateKind, find_template};

/// Run the parsed command line.
///
/// # Errors
///
/// Returns whatever the selected subcommand returns.
pub fn dispatch(
    cli: &Cli,
    log: &Arc<Logger>,
    sync: &dyn RepositorySync,
    term: &mut Terminal<'_>,
) -> Result<()> {
    let global = &cli.global;
    match &cli.command {
        Command::List(opts) => list::run(global, opts, log, sync, term),
        Command::Sync(opts) => sync::run(global, opts, log, sync, term),
        Command::Install(opts) => install::run(global, opts, log, sync, term),
        Command::Apply(opts) => apply::run(global, opts, log, sync, term),
        Command::Uninstall(opts) => uninstall::run(global, opts, log, sync, term),
        Command::Status(opts) => status::run(global, opts, log, term),
        Command::Config(opts) => config::run(global, &opts.action, term),
        Command::Completions(opts) => completions::run(opts, term),
        Command::Version => version::run(term),
    }
}

/// Command output and confirmation prompts.
///
/// Wraps borrowed input and output streams so commands can be driven from
/// byte buffers in tests.
pub struct Terminal<'a> {
    input: &'a mut dyn BufRead,
    out: &'a mut dyn Write,
}

impl std::fmt::Debug for Terminal<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Terminal").finish_non_exhaustive()
    }
}

impl<'a> Terminal<'a> {
    /// Wrap an input and an output stream.
    pub fn new(input: &'a mut dyn BufRead, out: &'a mut dyn Write) -> Self {
        Self { input, out }
    }

    /// Write `text` verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error if the output stream is closed.
    pub fn print(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    /// Write `value` as pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer_pretty(&mut *self.out, value)?;
        writeln!(self.out)?;
        Ok(())
    }

    /// Ask a yes/no question; anything but `y` or `yes` means no.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be written or the answer read.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.out, "{question} [y/N] ")?;
        self.out.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        Ok(matches!(
            answer.trim().to_ascii_lowercase().as_str(),
            "y" | "yes"
        ))
    }
}

/// Shared state produced by the common command setup sequence.
///
/// Loads the config file, applies command-line overrides, and resolves the
/// output format so that each command does not repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Effective configuration (file plus `--repo`).
    pub config: Config,
    /// Output format for command results.
    pub format: OutputFormat,
    /// `--verbose` was given.
    pub verbose: bool,
}

impl CommandSetup {
    /// Load the config named by `--config` (or the default location) and apply
    /// the global overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or `--repo` is
    /// not a valid repository URL.
    pub fn init(global: &GlobalOpts) -> Result<Self> {
        let path = config_path(global)?;
        let config = Config::load(&path)?;
        Self::new(config, global)
    }

    /// Apply the global overrides to an already loaded config.
    ///
    /// # Errors
    ///
    /// Returns an error if `--repo` is not a valid repository URL.
    pub fn new(mut config: Config, global: &GlobalOpts) -> Result<Self> {
        if let Some(url) = &global.repo {
            config.repository.url = Some(validation::validate_repo_url(url)?);
        }
        let format = global.format.unwrap_or(config.behavior.default_format);
        Ok(Self {
            config,
            format,
            verbose: global.verbose,
        })
    }

    /// Build a materialization context rooted at the configured home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined.
    pub fn context(&self, log: Arc<dyn Log>) -> Result<Context> {
        Ok(Context::new(log, self.config.home_dir()?))
    }

    /// Resolve the repository root, syncing first when `auto_sync` is on or
    /// the cache does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if no repository is configured or the sync fails.
    pub fn repository(&self, sync: &dyn RepositorySync, log: &dyn Log) -> Result<PathBuf> {
        match self.location()? {
            Location::Local(path) => Ok(path),
            Location::Cache(path) if !self.config.behavior.auto_sync && path.exists() => {
                log.debug(&format!("auto-sync disabled, using {}", path.display()));
                Ok(path)
            }
            Location::Cache(_) => Ok(self.sync_now(sync, None, false, log)?.path),
        }
    }

    /// Resolve the repository root without syncing.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotSynced`] if the cache has not been
    /// created yet.
    pub fn cached_repository(&self) -> Result<PathBuf> {
        match self.location()? {
            Location::Local(path) => Ok(path),
            Location::Cache(path) if path.exists() => Ok(path),
            Location::Cache(path) => Err(RepositoryError::NotSynced { path }.into()),
        }
    }

    /// Clone or update the repository cache now.
    ///
    /// `branch` overrides `repository.branch`.  A repository URL naming a
    /// local directory is used in place and reported as
    /// [`SyncChange::Local`].
    ///
    /// # Errors
    ///
    /// Returns an error if no repository is configured, the branch name is
    /// invalid, or the Git operation fails.
    pub fn sync_now(
        &self,
        sync: &dyn RepositorySync,
        branch: Option<&str>,
        force: bool,
        log: &dyn Log,
    ) -> Result<SyncReport> {
        let url = self.config.repo_url()?;
        let branch = match branch {
            Some(b) => validation::validate_branch(b)?,
            None => self.config.repository.branch.clone(),
        };
        match self.location()? {
            Location::Local(path) => Ok(SyncReport {
                path,
                change: SyncChange::Local,
            }),
            Location::Cache(cache_dir) => {
                log.debug(&format!(
                    "syncing {url} ({branch}) into {}",
                    cache_dir.display()
                ));
                let report = sync
                    .ensure_repo(url, &branch, &cache_dir, force)
                    .with_context(|| format!("syncing repository {url}"))?;
                Ok(report)
            }
        }
    }

    fn location(&self) -> Result<Location> {
        let url = self.config.repo_url()?;
        if let Some(path) = local_repository(url) {
            return Ok(Location::Local(path));
        }
        Ok(Location::Cache(self.config.repo_cache_dir(url)?))
    }

    /// Whether install scripts need an explicit yes before running.
    #[must_use]
    pub const fn prompts_for_scripts(&self) -> bool {
        self.config.behavior.prompt_for_scripts
    }
}

/// Where the template repository lives on disk.
enum Location {
    /// A plain directory path given as the repository URL.
    Local(PathBuf),
    /// The managed clone under the config directory.
    Cache(PathBuf),
}

/// Config file path from `--config` or the default location.
///
/// # Errors
///
/// Returns an error if no default config directory can be derived.
pub fn config_path(global: &GlobalOpts) -> Result<PathBuf> {
    match &global.config {
        Some(path) => Ok(path.clone()),
        None => Ok(Config::default_path()?),
    }
}

fn local_repository(url: &str) -> Option<PathBuf> {
    let path = Path::new(url);
    (!url.contains("://") && path.is_dir()).then(|| dunce::simplified(path).to_path_buf())
}

/// Look up a template of `kind`, listing the alternatives when it is missing.
///
/// # Errors
///
/// Returns [`TemplateError::NotFound`] if no template of that kind is named
/// `name`.
pub fn find<'a>(
    templates: &'a [Template],
    name: &str,
    kind: TemplateKind,
    log: &dyn Log,
) -> Result<&'a Template, TemplateError> {
    find_template(templates, name, Some(kind)).inspect_err(|e| {
        if let TemplateError::NotFound { available, .. } = e
            && !available.is_empty()
        {
            log.info(&format!(
                "available {kind} templates: {}",
                available.join(", ")
            ));
        }
    })
}

/// One-character marker for an item outcome in text reports.
#[must_use]
pub const fn outcome_marker(outcome: &ItemOutcome) -> &'static str {
    match outcome {
        ItemOutcome::Applied => "✓",
        ItemOutcome::AlreadyCorrect => "=",
        ItemOutcome::DryRun => "~",
        ItemOutcome::Skipped { .. } => "-",
        ItemOutcome::Failed { .. } => "✗",
    }
}

/// Turn a report's failure count into the command result.
///
/// # Errors
///
/// Returns [`MaterializeError::Incomplete`] if `failed` is non-zero.
pub fn ensure_complete(template: &str, action: &'static str, failed: usize) -> Result<()> {
    if failed > 0 {
        return Err(MaterializeError::Incomplete {
            template: template.to_string(),
            action,
            failed,
        }
        .into());
    }
    Ok(())
}

/// When a template's `install.sh` may run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScriptPolicy {
    /// `--no-script` was given.
    pub skip: bool,
    /// Dry run; scripts never run.
    pub dry_run: bool,
    /// Ask before running.
    pub prompt: bool,
}

/// What happened to a template's install script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptOutcome {
    /// The template has no install script.
    Absent,
    /// Disabled by `--no-script` or a dry run.
    Skipped,
    /// The user answered no.
    Declined,
    /// The script exited successfully.
    Succeeded,
    /// The script could not be started or exited non-zero.
    Failed,
}

/// Run the template's install script from `run_dir` if the policy allows.
///
/// A failing script is logged as a warning; the files are already in place.
///
/// # Errors
///
/// Returns an error only if the confirmation prompt cannot be shown.
pub fn run_install_script(
    template: &Template,
    run_dir: &Path,
    policy: ScriptPolicy,
    log: &dyn Log,
    term: &mut Terminal<'_>,
) -> Result<ScriptOutcome> {
    let Some(script) = template.install_script_path() else {
        return Ok(ScriptOutcome::Absent);
    };
    if policy.skip {
        log.debug(&format!("skipping {}", script.display()));
        return Ok(ScriptOutcome::Skipped);
    }
    if policy.dry_run {
        log.dry_run(&format!("would run {}", script.display()));
        return Ok(ScriptOutcome::Skipped);
    }
    if policy.prompt && !term.confirm(&format!("Run install script for '{}'?", template.name))? {
        log.info("install script skipped");
        return Ok(ScriptOutcome::Declined);
    }

    log.stage("Running install script");
    match exec::run_script(&script, run_dir, &template.root_path) {
        Ok(result) => {
            if !result.stdout.trim().is_empty() {
                log.info(result.stdout.trim_end());
            }
            log.info("install script completed");
            Ok(ScriptOutcome::Succeeded)
        }
        Err(e) => {
            log.warn(&format!("install script failed: {e:#}"));
            Ok(ScriptOutcome::Failed)
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod test_support {
    use super::*;

    /// Byte buffers standing in for stdin and stdout.
    pub struct Io {
        pub input: &'static [u8],
        pub out: Vec<u8>,
    }

    impl Io {
        pub fn answering(input: &'static str) -> Self {
            Self {
                input: input.as_bytes(),
                out: Vec::new(),
            }
        }

        pub fn terminal(&mut self) -> Terminal<'_> {
            Terminal::new(&mut self.input, &mut self.out)
        }

        pub fn output(&self) -> String {
            String::from_utf8(self.out.clone()).unwrap()
        }
    }

    /// A setup pointing at a local repository directory.
    pub fn local_setup(repo: &Path, home: &Path, format: OutputFormat) -> CommandSetup {
        let mut config = Config::default();
        config.repository.url = Some(repo.display().to_string());
        config.paths.home = Some(home.to_path_buf());
        config.behavior.prompt_for_scripts = false;
        config.behavior.default_format = format;
        CommandSetup::new(config, &GlobalOpts::default()).unwrap()
    }
}
