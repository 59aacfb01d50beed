//! Idempotent resource primitives (check + apply pattern).
//!
//! A resource is one planned filesystem entry: a [`symlink::PlannedLink`]
//! for dotfiles or a [`copy::CopyIntent`] for projects.  Each knows how to
//! describe itself and how to bring the filesystem to its desired state.
pub mod checksum;
pub mod copy;
pub mod helpers;
pub mod symlink;

use anyhow::Result;

/// Interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// When `force` is set, whatever occupies the target is removed first.
    /// Otherwise an occupied target is refused with an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// permission issues, an occupied target, or a missing source.
    fn apply(&self, force: bool) -> Result<ResourceChange>;
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use dotforge_cli::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created or updated.
    Applied,
    /// Resource was already correct (no change needed).
    AlreadyCorrect,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    struct TestResource {
        occupied: bool,
    }

    impl Applicable for TestResource {
        fn description(&self) -> String {
            "test resource".to_string()
        }

        fn apply(&self, force: bool) -> Result<ResourceChange> {
            if self.occupied && !force {
                anyhow::bail!("target exists");
            }
            Ok(ResourceChange::Applied)
        }
    }

    #[test]
    fn apply_through_trait_object() {
        let resource: &dyn Applicable = &TestResource { occupied: true };
        assert!(resource.apply(false).is_err());
        assert_eq!(resource.apply(true).unwrap(), ResourceChange::Applied);
        assert_eq!(resource.description(), "test resource");
    }
}
