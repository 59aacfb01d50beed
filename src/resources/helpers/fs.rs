//! File-system resource helpers.
use anyhow::{Context as _, Result};
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove whatever is at `path`: file, symlink (including broken ones) or
/// directory tree.  Does nothing if `path` does not exist.
///
/// Symlinks are removed themselves, never followed.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_existing(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("remove existing directory: {}", path.display()))?;
    } else {
        std::fs::remove_file(path)
            .with_context(|| format!("remove existing: {}", path.display()))?;
    }
    Ok(())
}

/// Copy `source` to `target` keeping permission bits and timestamps.
///
/// [`std::fs::copy`] already carries the permission bits; access and
/// modification times are applied afterwards.
///
/// # Errors
///
/// Returns an error if the copy or the timestamp update fails.
pub fn copy_file_with_metadata(source: &Path, target: &Path) -> Result<u64> {
    let bytes = std::fs::copy(source, target)
        .with_context(|| format!("copying {} to {}", source.display(), target.display()))?;
    let meta = std::fs::metadata(source)
        .with_context(|| format!("reading metadata: {}", source.display()))?;
    let mut times = std::fs::FileTimes::new();
    if let Ok(accessed) = meta.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = meta.modified() {
        times = times.set_modified(modified);
    }
    // The copy may be read-only; timestamps only need a read handle.
    let file = std::fs::File::open(target)
        .with_context(|| format!("opening {}", target.display()))?;
    file.set_times(times)
        .with_context(|| format!("setting timestamps on {}", target.display()))?;
    Ok(bytes)
}
