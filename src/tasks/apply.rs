//! File copier for project templates.
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{Context, ItemOutcome, MaterializeOptions, apply_item, record};
use crate::error::TemplateError;
use crate::resources::Applicable as _;
use crate::resources::copy::{CopyIntent, PlannedCopy};
use crate::templates::{Template, expected_copies, plan_project_copies};

/// One declared file of a project template and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyEntry {
    /// File inside the repository.
    pub source: PathBuf,
    /// Destination inside the target directory.
    pub target: PathBuf,
    /// Its outcome.
    #[serde(flatten)]
    pub outcome: ItemOutcome,
    /// Completed record; present only when the copy happened (or was simulated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copy: Option<PlannedCopy>,
}

/// Per-file results of applying a project template.
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// Template name.
    pub template: String,
    /// Directory the template was applied to.
    pub target_dir: PathBuf,
    /// One entry per declared file, in template order.
    pub entries: Vec<CopyEntry>,
}

impl ApplyReport {
    /// `true` unless some eligible file failed.  Skipped files do not count.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.entries.iter().any(|e| e.outcome.is_failure())
    }

    /// Records of every completed (or simulated) copy.
    #[must_use]
    pub fn completed(&self) -> Vec<&PlannedCopy> {
        self.entries.iter().filter_map(|e| e.copy.as_ref()).collect()
    }

    /// Number of failed files.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }
}

/// Apply a project template by copying each file into `target_dir`.
///
/// An existing target is a per-file failure unless `force` is set.  Files
/// whose source is missing are reported as skipped.  With `dry_run` the
/// records are computed from the sources and nothing is written.
///
/// # Errors
///
/// Returns [`TemplateError::WrongKind`] for dotfiles templates and
/// [`TemplateError::DirectoryNotFound`] if the template directory is gone.
pub fn apply_template(
    ctx: &Context,
    template: &Template,
    repo_root: &Path,
    target_dir: &Path,
    opts: MaterializeOptions,
) -> Result<ApplyReport, TemplateError> {
    let planned = plan_project_copies(
        template,
        repo_root,
        target_dir,
        ctx.fs_ops.as_ref(),
        ctx.log.as_ref(),
    )?;

    if !opts.dry_run
        && let Err(e) = std::fs::create_dir_all(target_dir)
    {
        ctx.log.error(&format!(
            "cannot create target directory {}: {e}",
            target_dir.display()
        ));
    }

    let mut entries = Vec::with_capacity(template.files.len());
    for intent in expected_copies(template, repo_root, target_dir) {
        let (outcome, copy) = if planned.contains(&intent) {
            copy_one(ctx, &intent, opts)
        } else {
            let reason = "source not found".to_string();
            (ItemOutcome::Skipped { reason }, None)
        };
        record(ctx, &intent.target, &outcome);
        entries.push(CopyEntry {
            source: intent.source,
            target: intent.target,
            outcome,
            copy,
        });
    }

    Ok(ApplyReport {
        template: template.name.clone(),
        target_dir: target_dir.to_path_buf(),
        entries,
    })
}

fn copy_one(
    ctx: &Context,
    intent: &CopyIntent,
    opts: MaterializeOptions,
) -> (ItemOutcome, Option<PlannedCopy>) {
    let outcome = if opts.dry_run {
        ctx.log.dry_run(&format!("would copy {}", intent.description()));
        ItemOutcome::DryRun
    } else {
        apply_item(ctx, intent, opts.force, "copy")
    };
    if outcome.is_failure() {
        return (outcome, None);
    }
    match intent.record() {
        Ok(copy) => (outcome, Some(copy)),
        Err(e) => {
            let reason = format!("cannot checksum {}: {e}", intent.source.display());
            ctx.log.warn(&reason);
            (ItemOutcome::Failed { reason }, None)
        }
    }
}
