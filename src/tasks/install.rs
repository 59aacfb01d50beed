//! Symlink installer for dotfiles templates.
use std::path::Path;

use serde::Serialize;

use super::{Context, ItemOutcome, MaterializeOptions, apply_item, record};
use crate::error::TemplateError;
use crate::resources::Applicable as _;
use crate::resources::symlink::PlannedLink;
use crate::templates::{Template, expected_links, plan_dotfile_links};

/// One link and what happened to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    /// The link.
    #[serde(flatten)]
    pub link: PlannedLink,
    /// Its outcome.
    #[serde(flatten)]
    pub outcome: ItemOutcome,
}

/// Per-link results of installing or uninstalling a dotfiles template.
#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    /// Template name.
    pub template: String,
    /// One entry per declared file, in template order.
    pub entries: Vec<LinkEntry>,
}

impl LinkReport {
    /// `true` unless some link failed.  Skipped links do not count.
    #[must_use]
    pub fn success(&self) -> bool {
        !self.entries.iter().any(|e| e.outcome.is_failure())
    }

    /// Links that are in place (or would be, in a dry run).
    #[must_use]
    pub fn completed(&self) -> Vec<&PlannedLink> {
        self.entries
            .iter()
            .filter(|e| e.outcome.is_completed())
            .map(|e| &e.link)
            .collect()
    }

    /// Number of failed links.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.outcome.is_failure()).count()
    }
}

/// Install a dotfiles template by symlinking each file into `ctx.home`.
///
/// Files whose source is missing are reported as skipped.  A failing link
/// is recorded and the remaining links are still attempted.  With
/// `dry_run` nothing on disk changes.
///
/// # Errors
///
/// Returns [`TemplateError::WrongKind`] for project templates and
/// [`TemplateError::DirectoryNotFound`] if the template directory is gone.
pub fn install_template(
    ctx: &Context,
    template: &Template,
    repo_root: &Path,
    opts: MaterializeOptions,
) -> Result<LinkReport, TemplateError> {
    let planned = plan_dotfile_links(
        template,
        repo_root,
        &ctx.home,
        ctx.fs_ops.as_ref(),
        ctx.log.as_ref(),
    )?;

    let mut entries = Vec::with_capacity(template.files.len());
    for link in expected_links(template, repo_root, &ctx.home) {
        let outcome = if !planned.contains(&link) {
            ItemOutcome::Skipped {
                reason: "source not found".to_string(),
            }
        } else if opts.dry_run {
            ctx.log.dry_run(&format!("would link {}", link.description()));
            ItemOutcome::DryRun
        } else {
            apply_item(ctx, &link, opts.force, "link")
        };
        record(ctx, &link.target, &outcome);
        entries.push(LinkEntry { link, outcome });
    }

    Ok(LinkReport {
        template: template.name.clone(),
        entries,
    })
}
