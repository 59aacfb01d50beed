//! Domain-specific error types for the template engine.
//!
//! Library modules return typed errors built with [`thiserror`]; command
//! handlers at the CLI boundary convert them to [`anyhow::Error`] with `?`
//! and [`exit_code`] recovers the process exit status from the chain.
//!
//! # Error hierarchy
//!
//! ```text
//! DotforgeError
//! ├── Config(ConfigError)            config file I/O, invalid values
//! ├── Template(TemplateError)        lookup, kind, missing directory, validation
//! ├── Repository(RepositoryError)    clone / fetch / checkout failures
//! └── Materialize(MaterializeError)  conflicts, partially applied templates
//! ```
//!
//! Per-item failures (one symlink, one copy) never appear here. They are
//! reported as [`ItemOutcome::Failed`](crate::tasks::ItemOutcome::Failed).

use std::path::PathBuf;

use thiserror::Error;

use crate::templates::TemplateKind;

/// Exit code for configuration, lookup and validation failures.
pub const EXIT_GENERAL: i32 = 1;
/// Exit code for conflicts and partially applied templates.
pub const EXIT_CONFLICT: i32 = 2;
/// Exit code for repository (Git) failures.
pub const EXIT_REPOSITORY: i32 = 4;

/// Top-level error type for the template engine.
#[derive(Error, Debug)]
pub enum DotforgeError {
    /// Configuration-related error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Template lookup or structural error.
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Git repository error.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Materialization finished but not everything was applied.
    #[error("{0}")]
    Materialize(#[from] MaterializeError),
}

impl DotforgeError {
    /// Process exit code associated with this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Template(_) => EXIT_GENERAL,
            Self::Repository(_) => EXIT_REPOSITORY,
            Self::Materialize(_) => EXIT_CONFLICT,
        }
    }
}

/// Errors that arise from loading, validating, or saving the CLI config.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read or written.
    #[error("IO error on config file {path}: {source}")]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML or has the wrong shape.
    #[error("Invalid config file {path}: {message}")]
    Parse {
        /// Path to the file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// A value failed validation.
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue {
        /// Dotted key (e.g. `repository.url`).
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The key is not recognized (or cannot be written).
    #[error("Unknown configuration key '{key}'. Valid keys: {valid}")]
    UnknownKey {
        /// Key supplied by the user.
        key: String,
        /// Comma-separated list of accepted keys.
        valid: String,
    },

    /// No repository URL is configured.
    #[error("No repository configured. Use 'dotforge config set repository.url <url>'")]
    NotConfigured,

    /// The home directory could not be determined.
    #[error("Cannot determine home directory: HOME is not set")]
    NoHome,
}

/// Structural template errors. These abort the whole operation.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// No template with this name exists in the catalog.
    #[error("Template '{name}' not found")]
    NotFound {
        /// Requested template name.
        name: String,
        /// Names of templates that do exist (of the requested kind).
        available: Vec<String>,
    },

    /// The template directory disappeared between discovery and use.
    #[error("Template directory not found: {}", path.display())]
    DirectoryNotFound {
        /// Expected template root.
        path: PathBuf,
    },

    /// A dotfiles-only operation was invoked on a project template, or the
    /// other way around.
    #[error("Template {name} is not a {expected} template (found {actual})")]
    WrongKind {
        /// Template name.
        name: String,
        /// Kind required by the operation.
        expected: TemplateKind,
        /// Kind the template actually has.
        actual: TemplateKind,
    },

    /// The template failed validation.
    #[error("Invalid template: {0}")]
    Validation(#[from] ValidationError),
}

/// Reasons a discovered template directory is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Name contains characters outside `[A-Za-z0-9._-]` or is empty.
    #[error(
        "template name '{0}' must contain only alphanumerics, hyphens, underscores and dots"
    )]
    InvalidName(String),

    /// Name starts or ends with a dot.
    #[error("template name '{0}' cannot start or end with a dot")]
    DottedName(String),

    /// The template has no files after exclusions.
    #[error("template must contain at least one file")]
    NoFiles,

    /// A file path is empty.
    #[error("file paths cannot be empty")]
    EmptyPath,

    /// A file path is absolute.
    #[error("file path must be relative, got: {0}")]
    AbsolutePath(String),

    /// The install script path is absolute.
    #[error("install script path must be relative, got: {0}")]
    AbsoluteInstallScript(String),
}

/// Errors raised by the Git sync collaborator.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Cloning failed.
    #[error("Failed to clone {url}: {source}")]
    Clone {
        /// Remote URL.
        url: String,
        /// libgit2 error.
        source: git2::Error,
    },

    /// Fetching, checking out or resetting failed.
    #[error("Failed to sync repository at {}: {source}", path.display())]
    Sync {
        /// Local cache path.
        path: PathBuf,
        /// libgit2 error.
        source: git2::Error,
    },

    /// Local history diverged from the remote and `--force` was not given.
    #[error("Local branch '{branch}' has diverged from origin; re-run with --force")]
    Diverged {
        /// Branch being synced.
        branch: String,
    },

    /// The cache directory could not be prepared.
    #[error("Cannot prepare cache directory {}: {source}", path.display())]
    Io {
        /// Cache directory.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The repository cache has not been created yet.
    #[error("Repository cache not found at {}. Run 'dotforge sync' first", path.display())]
    NotSynced {
        /// Expected cache directory.
        path: PathBuf,
    },
}

/// A template was processed but the result is not a clean success.
#[derive(Error, Debug)]
pub enum MaterializeError {
    /// Some items failed.
    #[error("Template '{template}' {action} failed: {failed} item(s) could not be applied")]
    Incomplete {
        /// Template name.
        template: String,
        /// `installation` or `application`.
        action: &'static str,
        /// Number of failed items.
        failed: usize,
    },

    /// The user declined to continue past conflicts.
    #[error("Aborted: {count} conflicting file(s) in target directory")]
    ConflictsDeclined {
        /// Number of conflicts found.
        count: usize,
    },
}

/// Map an error chain to the process exit code.
///
/// Walks the [`anyhow`] chain and returns the code of the first typed error
/// it recognizes; anything else maps to [`EXIT_GENERAL`].
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<DotforgeError>() {
            return e.exit_code();
        }
        if cause.downcast_ref::<RepositoryError>().is_some() {
            return EXIT_REPOSITORY;
        }
        if cause.downcast_ref::<MaterializeError>().is_some() {
            return EXIT_CONFLICT;
        }
        if cause.downcast_ref::<ConfigError>().is_some()
            || cause.downcast_ref::<TemplateError>().is_some()
        {
            return EXIT_GENERAL;
        }
    }
    EXIT_GENERAL
}
