//! Symlink resource and link status classification.
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::helpers::fs::{ensure_parent_dir, remove_existing};
use super::{Applicable, ResourceChange};
use crate::operations::FileSystemOps;

/// A single intended symbolic link `target -> source`.
///
/// Equality compares `source` and `target` only.
#[derive(Debug, Clone, Serialize)]
pub struct PlannedLink {
    /// What the symlink points to (inside the repository).
    pub source: PathBuf,
    /// Where the symlink is created (under the home directory).
    pub target: PathBuf,
    /// Owning template.
    pub template_name: String,
}

impl PartialEq for PlannedLink {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.target == other.target
    }
}

impl Eq for PlannedLink {}

/// Classification of an expected link against the filesystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LinkStatus {
    /// Target is a symlink resolving to the source.
    Ok,
    /// Target is a symlink resolving somewhere else (or nowhere).
    WrongTarget {
        /// Where the link actually leads.
        actual_source: PathBuf,
    },
    /// Target exists but is a regular file or directory.
    NotSymlink,
    /// Nothing exists at the target.
    Missing,
}

impl LinkStatus {
    /// Short label used in reports.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::WrongTarget { .. } => "wrong_target",
            Self::NotSymlink => "not_symlink",
            Self::Missing => "missing",
        }
    }
}

impl PlannedLink {
    /// Create a new planned link.
    #[must_use]
    pub fn new(source: PathBuf, target: PathBuf, template_name: &str) -> Self {
        Self {
            source,
            target,
            template_name: template_name.to_string(),
        }
    }

    /// Classify the target without modifying anything.
    #[must_use]
    pub fn status(&self, fs: &dyn FileSystemOps) -> LinkStatus {
        if fs.is_symlink(&self.target) {
            let expected = fs
                .canonicalize(&self.source)
                .unwrap_or_else(|_| self.source.clone());
            match fs.canonicalize(&self.target) {
                Ok(resolved) if paths_equal(&resolved, &expected) => LinkStatus::Ok,
                Ok(resolved) => LinkStatus::WrongTarget {
                    actual_source: resolved,
                },
                // Dangling: report the raw destination.
                Err(_) => LinkStatus::WrongTarget {
                    actual_source: fs.read_link(&self.target).unwrap_or_default(),
                },
            }
        } else if fs.exists(&self.target) {
            LinkStatus::NotSymlink
        } else {
            LinkStatus::Missing
        }
    }

    /// Check that the link can be created, creating the parent directory if
    /// it is missing.
    ///
    /// # Errors
    ///
    /// Returns the reason the link cannot be created.
    pub fn can_create(&self) -> Result<(), String> {
        if let Ok(meta) = self.target.symlink_metadata()
            && !meta.file_type().is_symlink()
        {
            return Err("target exists and is not a symlink".to_string());
        }
        if !self.source.exists() {
            return Err(format!("source does not exist: {}", self.source.display()));
        }
        let Some(parent) = self.target.parent() else {
            return Ok(());
        };
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                format!("cannot create parent directory {}: {e}", parent.display())
            })?;
        }
        Ok(())
    }

    /// `true` if the target is a symlink whose stored destination is the source.
    fn points_to_source(&self) -> bool {
        std::fs::read_link(&self.target).is_ok_and(|existing| paths_equal(&existing, &self.source))
    }
}

impl Applicable for PlannedLink {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self, force: bool) -> Result<ResourceChange> {
        if force {
            remove_existing(&self.target)?;
        } else if self.points_to_source() {
            return Ok(ResourceChange::AlreadyCorrect);
        }

        if let Err(reason) = self.can_create() {
            anyhow::bail!(reason);
        }
        if self.target.symlink_metadata().is_ok() {
            anyhow::bail!("target exists as a symlink to another location (use --force to replace)");
        }

        ensure_parent_dir(&self.target)?;
        create_symlink(&self.source, &self.target).map_err(|e| {
            let denied = e
                .downcast_ref::<std::io::Error>()
                .is_some_and(|io| io.kind() == std::io::ErrorKind::PermissionDenied);
            match self.target.parent() {
                Some(parent) if denied => {
                    anyhow::anyhow!("no write permission in {}", parent.display())
                }
                _ => e.context(format!("create link: {}", self.target.display())),
            }
        })?;

        Ok(ResourceChange::Applied)
    }
}

/// Compare two paths for equality, handling UNC prefix normalization on Windows.
fn paths_equal(a: &Path, b: &Path) -> bool {
    let normalize = |p: &Path| -> PathBuf {
        #[cfg(windows)]
        {
            let s = p.to_string_lossy();
            if let Some(stripped) = s.strip_prefix(r"\\?\") {
                return PathBuf::from(stripped);
            }
        }
        p.to_path_buf()
    };

    normalize(a) == normalize(b)
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {} (requires developer mode or admin)",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}
