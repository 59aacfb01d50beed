use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::OutputFormat;
use crate::templates::TemplateKind;

/// Version string, pinned by the build or taken from the package.
pub const VERSION: &str = match option_env!("DOTFORGE_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

/// Top-level CLI entry point.
#[derive(Parser, Debug)]
#[command(
    name = "dotforge",
    about = "Install dotfiles and apply project templates from a Git repository",
    version = VERSION
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Path to the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Template repository URL (overrides the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub repo: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format (defaults to behavior.default_format)
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List templates in the repository
    List(ListOpts),
    /// Clone or update the local repository cache
    Sync(SyncOpts),
    /// Symlink a dotfiles template into the home directory
    Install(InstallOpts),
    /// Copy a project template into a directory
    Apply(ApplyOpts),
    /// Remove the links of an installed dotfiles template
    Uninstall(UninstallOpts),
    /// Show link status of dotfiles templates
    Status(StatusOpts),
    /// Manage CLI configuration
    Config(ConfigOpts),
    /// Generate shell completions
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Subcommand name, used for the log file name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::Sync(_) => "sync",
            Self::Install(_) => "install",
            Self::Apply(_) => "apply",
            Self::Uninstall(_) => "uninstall",
            Self::Status(_) => "status",
            Self::Config(_) => "config",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Template kinds accepted by `list --type`.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TypeFilter {
    /// Every template
    #[default]
    All,
    /// Dotfiles templates only
    Dotfiles,
    /// Project templates only
    Projects,
}

impl TypeFilter {
    /// `true` if templates of `kind` pass the filter.
    #[must_use]
    pub const fn matches(self, kind: TemplateKind) -> bool {
        match self {
            Self::All => true,
            Self::Dotfiles => matches!(kind, TemplateKind::Dotfiles),
            Self::Projects => matches!(kind, TemplateKind::Project),
        }
    }
}

/// Options for the `list` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ListOpts {
    /// Glob pattern matched against template names
    pub pattern: Option<String>,

    /// Restrict to one template kind
    #[arg(long = "type", value_enum, default_value_t = TypeFilter::All)]
    pub kind: TypeFilter,

    /// Show descriptions, file counts and install scripts
    #[arg(short, long)]
    pub detailed: bool,
}

/// Options for the `sync` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SyncOpts {
    /// Branch to sync (overrides the config file)
    #[arg(long)]
    pub branch: Option<String>,

    /// Discard local history that cannot be fast-forwarded
    #[arg(short, long)]
    pub force: bool,
}

/// Options for the `install` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Dotfiles template name
    pub name: String,

    /// Replace whatever exists at link targets
    #[arg(short, long)]
    pub force: bool,

    /// Show what would be done without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not run the template's install.sh
    #[arg(long)]
    pub no_script: bool,
}

/// Options for the `apply` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct ApplyOpts {
    /// Project template name
    pub name: String,

    /// Target directory (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub target: Option<PathBuf>,

    /// Overwrite existing files
    #[arg(short, long)]
    pub force: bool,

    /// Show what would be done without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not run the template's install.sh
    #[arg(long)]
    pub no_script: bool,

    /// Overwrite conflicting files and run install.sh without asking
    #[arg(short, long)]
    pub yes: bool,
}

/// Options for the `uninstall` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct UninstallOpts {
    /// Dotfiles template name
    pub name: String,

    /// Show what would be removed without changing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Options for the `status` subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct StatusOpts {
    /// Only show this template
    #[arg(long)]
    pub template: Option<String>,
}

/// Options for the `config` subcommand.
#[derive(Args, Debug, Clone)]
pub struct ConfigOpts {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// `config` actions.
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the current configuration and derived paths
    Show,
    /// List every configuration key
    List,
    /// Print one value
    Get {
        /// Dotted key, e.g. repository.url
        key: String,
    },
    /// Set a value
    Set {
        /// Dotted key, e.g. repository.url
        key: String,
        /// New value
        value: String,
    },
    /// Restore a value to its default
    Unset {
        /// Dotted key, e.g. repository.branch
        key: String,
    },
    /// Reset the whole configuration to defaults
    Reset {
        /// Do not ask for confirmation
        #[arg(long)]
        confirm: bool,
    },
}

/// Options for the `completions` subcommand.
#[derive(Args, Debug, Clone)]
pub struct CompletionsOpts {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_install_flags() {
        let cli = Cli::parse_from(["dotforge", "install", "vim", "-f", "-n", "--no-script"]);
        let Command::Install(opts) = cli.command else {
            panic!("expected install");
        };
        assert_eq!(opts.name, "vim");
        assert!(opts.force);
        assert!(opts.dry_run);
        assert!(opts.no_script);
    }

    #[test]
    fn parse_apply_with_target() {
        let cli = Cli::parse_from(["dotforge", "apply", "web", "--target", "/tmp/app", "--yes"]);
        let Command::Apply(opts) = cli.command else {
            panic!("expected apply");
        };
        assert_eq!(opts.target, Some(PathBuf::from("/tmp/app")));
        assert!(opts.yes);
        assert!(!opts.force);
    }

    #[test]
    fn parse_list_filters() {
        let cli = Cli::parse_from(["dotforge", "list", "vim*", "--type", "dotfiles", "-d"]);
        let Command::List(opts) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(opts.pattern.as_deref(), Some("vim*"));
        assert_eq!(opts.kind, TypeFilter::Dotfiles);
        assert!(opts.detailed);
    }

    #[test]
    fn list_type_defaults_to_all() {
        let cli = Cli::parse_from(["dotforge", "list"]);
        let Command::List(opts) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(opts.kind, TypeFilter::All);
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "dotforge",
            "status",
            "--repo",
            "https://example.com/t.git",
            "--format",
            "json",
            "-v",
        ]);
        assert_eq!(cli.global.repo.as_deref(), Some("https://example.com/t.git"));
        assert_eq!(cli.global.format, Some(OutputFormat::Json));
        assert!(cli.global.verbose);
    }

    #[test]
    fn verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["dotforge", "-v", "-q", "list"]).is_err());
    }

    #[test]
    fn parse_config_set() {
        let cli = Cli::parse_from(["dotforge", "config", "set", "repository.branch", "dev"]);
        let Command::Config(opts) = cli.command else {
            panic!("expected config");
        };
        assert!(matches!(
            opts.action,
            ConfigAction::Set { ref key, ref value } if key == "repository.branch" && value == "dev"
        ));
    }

    #[test]
    fn parse_completions() {
        let cli = Cli::parse_from(["dotforge", "completions", "bash"]);
        assert_eq!(cli.command.name(), "completions");
    }

    #[test]
    fn parse_version() {
        let cli = Cli::parse_from(["dotforge", "version"]);
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn type_filter_matches_kinds() {
        assert!(TypeFilter::All.matches(TemplateKind::Project));
        assert!(TypeFilter::Projects.matches(TemplateKind::Project));
        assert!(!TypeFilter::Projects.matches(TemplateKind::Dotfiles));
    }
}
