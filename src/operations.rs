//! Filesystem query abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] trait so that planning, conflict detection
//! and link inspection can be unit-tested without touching the real
//! filesystem.  Production code uses [`SystemFileSystemOps`]; tests use
//! `MockFileSystemOps`.
//!
//! Only *queries* (and link removal) go through this trait.  Materialization
//! itself writes through [`crate::resources`] against the real filesystem.

use std::path::{Path, PathBuf};

/// Abstraction over the filesystem queries used by the template engine.
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists, following symlinks.
    ///
    /// A dangling symlink therefore does not exist.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if `path` itself is a symbolic link (dangling or not).
    fn is_symlink(&self, path: &Path) -> bool;

    /// Read the destination stored in the symbolic link at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be read.
    fn read_link(&self, path: &Path) -> std::io::Result<PathBuf>;

    /// Resolve `path` to an absolute path with every symlink followed.
    ///
    /// # Errors
    ///
    /// Returns an error if any component does not exist.
    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf>;

    /// Remove the file or symlink at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    fn remove(&self, path: &Path) -> std::io::Result<()>;

    /// Returns `true` if anything occupies `path`, without following a
    /// final symlink. A dangling symlink is an entry.
    fn entry_exists(&self, path: &Path) -> bool {
        self.is_symlink(path) || self.exists(path)
    }
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        std::fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
    }

    fn read_link(&self, path: &Path) -> std::io::Result<PathBuf> {
        std::fs::read_link(path)
    }

    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf> {
        dunce::canonicalize(path)
    }

    fn remove(&self, path: &Path) -> std::io::Result<()> {
        let meta = std::fs::symlink_metadata(path)?;
        if meta.is_dir() {
            std::fs::remove_dir(path)
        } else {
            std::fs::remove_file(path)
        }
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure existing paths and symlinks using the builder-style
/// methods, then pass `&mock` wherever a `&dyn FileSystemOps` is expected.
///
/// # Example
///
/// ```ignore
/// use dotforge_cli::operations::MockFileSystemOps;
///
/// let fs = MockFileSystemOps::new()
///     .with_file("/repo/dotfiles/vim/.vimrc")
///     .with_symlink("/home/u/.vimrc", "/repo/dotfiles/vim/.vimrc");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    existing: Vec<PathBuf>,
    symlinks: std::collections::HashMap<PathBuf, PathBuf>,
    removed: std::sync::Mutex<std::collections::HashSet<PathBuf>>,
}

#[cfg(test)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `path` as an existing file or directory.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        let p = path.into();
        if !self.existing.contains(&p) {
            self.existing.push(p);
        }
        self
    }

    /// Register `path` as a symbolic link pointing to `target`.
    ///
    /// Whether the link resolves depends on `target` being configured too.
    #[must_use]
    pub fn with_symlink(mut self, path: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        self.symlinks.insert(path.into(), target.into());
        self
    }

    fn is_removed(&self, path: &Path) -> bool {
        self.removed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains(path)
    }

    /// Follow symlinks until a non-link path is reached (bounded to avoid loops).
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let mut current = path.to_path_buf();
        for _ in 0..32 {
            if self.is_removed(&current) {
                return None;
            }
            match self.symlinks.get(&current) {
                Some(next) => current.clone_from(next),
                None => {
                    return self.existing.contains(&current).then_some(current);
                }
            }
        }
        None
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path).is_some()
    }

    fn is_symlink(&self, path: &Path) -> bool {
        !self.is_removed(path) && self.symlinks.contains_key(path)
    }

    fn read_link(&self, path: &Path) -> std::io::Result<PathBuf> {
        if self.is_removed(path) {
            return Err(std::io::Error::from(std::io::ErrorKind::NotFound));
        }
        self.symlinks
            .get(path)
            .cloned()
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::InvalidInput))
    }

    fn canonicalize(&self, path: &Path) -> std::io::Result<PathBuf> {
        self.resolve(path)
            .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
    }

    fn remove(&self, path: &Path) -> std::io::Result<()> {
        self.removed
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(path.to_path_buf());
        Ok(())
    }
}
