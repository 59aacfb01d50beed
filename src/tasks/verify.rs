//! Integrity checks for copied files.
use serde::Serialize;

use crate::resources::checksum::sha256_file;
use crate::resources::copy::PlannedCopy;

/// Drift classification of one copied file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    /// The copy no longer exists.
    Missing,
    /// The copy differs from what was written.
    Modified,
    /// The copy is intact but the repository file has moved on.
    SourceChanged,
    /// The copy matches both the record and the current source.
    Valid,
}

/// `true` if the target still has the checksum recorded at copy time.
///
/// A missing or unreadable target is never intact.
#[must_use]
pub fn verify_integrity(copy: &PlannedCopy) -> bool {
    sha256_file(&copy.target).is_ok_and(|sum| sum == copy.checksum)
}

/// `true` if the current source and target have identical content.
///
/// Either side being unreadable counts as a mismatch.
#[must_use]
pub fn verify_source_match(copy: &PlannedCopy) -> bool {
    match (sha256_file(&copy.source), sha256_file(&copy.target)) {
        (Ok(source), Ok(target)) => source == target,
        _ => false,
    }
}

/// Classify a copy against its record and its source.
#[must_use]
pub fn copy_status(copy: &PlannedCopy) -> CopyStatus {
    if copy.target.symlink_metadata().is_err() {
        CopyStatus::Missing
    } else if !verify_integrity(copy) {
        CopyStatus::Modified
    } else if !verify_source_match(copy) {
        CopyStatus::SourceChanged
    } else {
        CopyStatus::Valid
    }
}
