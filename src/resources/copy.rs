//! File copy resource and the completed copy record.
use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use super::checksum::sha256_file;
use super::helpers::fs::{copy_file_with_metadata, ensure_parent_dir, remove_existing};
use super::{Applicable, ResourceChange};

/// A planned copy of one template file, before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyIntent {
    /// File inside the repository.
    pub source: PathBuf,
    /// Destination inside the target directory.
    pub target: PathBuf,
    /// Owning template.
    pub template_name: String,
}

impl CopyIntent {
    /// Create a new copy intent.
    #[must_use]
    pub fn new(source: PathBuf, target: PathBuf, template_name: &str) -> Self {
        Self {
            source,
            target,
            template_name: template_name.to_string(),
        }
    }

    /// Capture the completed record from the current source content.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    pub fn record(&self) -> std::io::Result<PlannedCopy> {
        let meta = std::fs::metadata(&self.source)?;
        Ok(PlannedCopy {
            source: self.source.clone(),
            target: self.target.clone(),
            template_name: self.template_name.clone(),
            checksum: sha256_file(&self.source)?,
            size_bytes: meta.len(),
            mode: mode_bits(&meta),
        })
    }
}

impl Applicable for CopyIntent {
    fn description(&self) -> String {
        format!("{} <- {}", self.target.display(), self.source.display())
    }

    fn apply(&self, force: bool) -> Result<ResourceChange> {
        if self.target.symlink_metadata().is_ok() {
            if !force {
                anyhow::bail!("target exists (use --force to overwrite)");
            }
            remove_existing(&self.target)?;
        }
        ensure_parent_dir(&self.target)?;
        copy_file_with_metadata(&self.source, &self.target)?;
        Ok(ResourceChange::Applied)
    }
}

/// A completed (or dry-run simulated) copy.
///
/// `checksum` is the SHA-256 of the source at copy time and is the baseline
/// for later drift checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedCopy {
    /// File inside the repository.
    pub source: PathBuf,
    /// Destination inside the target directory.
    pub target: PathBuf,
    /// Owning template.
    pub template_name: String,
    /// Lowercase hex SHA-256 of the source content.
    pub checksum: String,
    /// Source size in bytes.
    pub size_bytes: u64,
    /// Source permission bits.
    pub mode: u32,
}

#[cfg(unix)]
fn mode_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt as _;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn mode_bits(meta: &std::fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn intent(dir: &std::path::Path) -> CopyIntent {
        CopyIntent::new(dir.join("repo/file.txt"), dir.join("work/sub/file.txt"), "p")
    }

    fn write_source(dir: &std::path::Path, content: &str) {
        std::fs::create_dir_all(dir.join("repo")).unwrap();
        std::fs::write(dir.join("repo/file.txt"), content).unwrap();
    }

    #[test]
    fn apply_copies_into_new_directories() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "hello");
        let c = intent(dir.path());

        assert_eq!(c.apply(false).unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_to_string(&c.target).unwrap(), "hello");
    }

    #[test]
    fn apply_refuses_existing_target_without_force() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "new");
        let c = intent(dir.path());
        std::fs::create_dir_all(c.target.parent().unwrap()).unwrap();
        std::fs::write(&c.target, "old").unwrap();

        assert!(c.apply(false).is_err());
        assert_eq!(std::fs::read_to_string(&c.target).unwrap(), "old");

        c.apply(true).unwrap();
        assert_eq!(std::fs::read_to_string(&c.target).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn force_does_not_write_through_symlinked_target() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "new");
        let c = intent(dir.path());
        let victim = dir.path().join("victim");
        std::fs::write(&victim, "untouched").unwrap();
        std::fs::create_dir_all(c.target.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&victim, &c.target).unwrap();

        c.apply(true).unwrap();

        assert_eq!(std::fs::read_to_string(&victim).unwrap(), "untouched");
        assert!(!c.target.symlink_metadata().unwrap().file_type().is_symlink());
    }

    #[test]
    fn record_captures_source_checksum_and_size() {
        let dir = tempfile::tempdir().unwrap();
        write_source(dir.path(), "hello\n");
        let record = intent(dir.path()).record().unwrap();

        assert_eq!(
            record.checksum,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
        assert_eq!(record.size_bytes, 6);
        assert_eq!(record.template_name, "p");
    }

    #[test]
    fn record_fails_for_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        assert!(intent(dir.path()).record().is_err());
    }
}
