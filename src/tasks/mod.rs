//! Materialization tasks built on top of [`crate::resources`].
//!
//! Template-level problems (wrong kind, missing template directory) are
//! returned as [`TemplateError`](crate::error::TemplateError).  Per-item
//! problems never abort a task: each planned item ends with an
//! [`ItemOutcome`] and the task carries on with the next one.
pub mod apply;
mod context;
pub mod install;
pub mod status;
pub mod uninstall;
pub mod verify;

pub use apply::{ApplyReport, CopyEntry, apply_template};
pub use context::{Context, home_dir};
pub use install::{LinkEntry, LinkReport, install_template};
pub use status::{LinkStatusEntry, TemplateStatus, template_status};
pub use uninstall::uninstall_template;
pub use verify::{CopyStatus, copy_status, verify_integrity, verify_source_match};

use serde::Serialize;

use crate::logging::ItemStatus;
use crate::resources::{Applicable, ResourceChange};

/// Flags for one materialization call, passed by value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeOptions {
    /// Replace whatever occupies a target.
    pub force: bool,
    /// Plan and report without touching the filesystem.
    pub dry_run: bool,
}

/// What happened to one planned item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ItemOutcome {
    /// Created or replaced.
    Applied,
    /// Already in the desired state.
    AlreadyCorrect,
    /// Would have been applied; dry run.
    DryRun,
    /// Deliberately left alone.
    Skipped {
        /// Why the item was not processed.
        reason: String,
    },
    /// Could not be applied.
    Failed {
        /// Error description.
        reason: String,
    },
}

impl ItemOutcome {
    /// `true` for [`ItemOutcome::Failed`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// `true` when the item is (or in a dry run would be) in place.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Applied | Self::AlreadyCorrect | Self::DryRun)
    }

    /// Summary status for the logger.
    #[must_use]
    pub const fn status(&self) -> ItemStatus {
        match self {
            Self::Applied => ItemStatus::Ok,
            Self::AlreadyCorrect => ItemStatus::Unchanged,
            Self::DryRun => ItemStatus::DryRun,
            Self::Skipped { .. } => ItemStatus::Skipped,
            Self::Failed { .. } => ItemStatus::Failed,
        }
    }

    /// Reason attached to skipped and failed items.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Skipped { reason } | Self::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Apply one resource, turning errors into [`ItemOutcome::Failed`].
///
/// The dry-run case is handled by callers since it differs per resource kind.
fn apply_item<R: Applicable>(ctx: &Context, resource: &R, force: bool, verb: &str) -> ItemOutcome {
    let desc = resource.description();
    match resource.apply(force) {
        Ok(ResourceChange::Applied) => {
            ctx.log.debug(&format!("{verb}: {desc}"));
            ItemOutcome::Applied
        }
        Ok(ResourceChange::AlreadyCorrect) => {
            ctx.log.debug(&format!("ok: {desc}"));
            ItemOutcome::AlreadyCorrect
        }
        Err(e) => {
            ctx.log.warn(&format!("failed to {verb} {desc}: {e:#}"));
            ItemOutcome::Failed {
                reason: format!("{e:#}"),
            }
        }
    }
}

/// Record an item outcome on the logger for the closing summary.
fn record(ctx: &Context, name: &std::path::Path, outcome: &ItemOutcome) {
    ctx.log
        .record_item(&name.display().to_string(), outcome.status(), outcome.reason());
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn outcome_classification() {
        assert!(ItemOutcome::DryRun.is_completed());
        assert!(ItemOutcome::AlreadyCorrect.is_completed());
        let failed = ItemOutcome::Failed {
            reason: "boom".to_string(),
        };
        assert!(failed.is_failure());
        assert!(!failed.is_completed());
        assert_eq!(failed.reason(), Some("boom"));
        let skipped = ItemOutcome::Skipped {
            reason: "source missing".to_string(),
        };
        assert!(!skipped.is_failure());
        assert!(!skipped.is_completed());
        assert_eq!(skipped.status(), ItemStatus::Skipped);
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(ItemOutcome::Skipped {
            reason: "x".to_string(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["reason"], "x");
        let json = serde_json::to_value(ItemOutcome::AlreadyCorrect).unwrap();
        assert_eq!(json["outcome"], "already_correct");
    }

    #[test]
    fn default_options_are_safe() {
        let opts = MaterializeOptions::default();
        assert!(!opts.force);
        assert!(!opts.dry_run);
    }
}
