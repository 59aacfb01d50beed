use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};

/// Shared collaborators for materialization.
///
/// Explicitly constructed and passed into every task; nothing here is global.
pub struct Context {
    /// Logger for output and item recording.
    pub log: Arc<dyn Log>,
    /// User's home directory path (dotfiles link targets live under it).
    pub home: PathBuf,
    /// Filesystem query abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("log", &"<dyn Log>")
            .field("home", &self.home)
            .field("fs_ops", &self.fs_ops)
            .finish()
    }
}

impl Context {
    /// Creates a new context using the real filesystem.
    #[must_use]
    pub fn new(log: Arc<dyn Log>, home: PathBuf) -> Self {
        Self {
            log,
            home,
            fs_ops: Arc::new(SystemFileSystemOps),
        }
    }

    /// Replace the filesystem abstraction.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }
}

/// The user's home directory from `HOME` (or `USERPROFILE` on Windows).
///
/// # Errors
///
/// Returns [`ConfigError::NoHome`] if the variable is not set.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    let var = if cfg!(target_os = "windows") {
        std::env::var("USERPROFILE").or_else(|_| std::env::var("HOME"))
    } else {
        std::env::var("HOME")
    };
    var.map(PathBuf::from).map_err(|_| ConfigError::NoHome)
}
