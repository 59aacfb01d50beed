//! Removal of links created by the installer.
use std::path::Path;

use super::{Context, ItemOutcome, LinkEntry, LinkReport, record};
use crate::error::TemplateError;
use crate::resources::Applicable as _;
use crate::resources::symlink::LinkStatus;
use crate::templates::{Template, TemplateKind, expected_links};

/// Remove every link of `template` that currently points into the repository.
///
/// Anything else at a target (a user file, a link elsewhere) is left alone
/// and reported as skipped with its status label as the reason.
///
/// # Errors
///
/// Returns [`TemplateError::WrongKind`] for project templates.
pub fn uninstall_template(
    ctx: &Context,
    template: &Template,
    repo_root: &Path,
    dry_run: bool,
) -> Result<LinkReport, TemplateError> {
    template.require_kind(TemplateKind::Dotfiles)?;

    let mut entries = Vec::with_capacity(template.files.len());
    for link in expected_links(template, repo_root, &ctx.home) {
        let outcome = match link.status(ctx.fs_ops.as_ref()) {
            LinkStatus::Ok if dry_run => {
                ctx.log.dry_run(&format!("would remove {}", link.description()));
                ItemOutcome::DryRun
            }
            LinkStatus::Ok => match ctx.fs_ops.remove(&link.target) {
                Ok(()) => {
                    ctx.log.debug(&format!("removed {}", link.target.display()));
                    ItemOutcome::Applied
                }
                Err(e) => {
                    let reason = format!("cannot remove {}: {e}", link.target.display());
                    ctx.log.warn(&reason);
                    ItemOutcome::Failed { reason }
                }
            },
            other => ItemOutcome::Skipped {
                reason: other.label().to_string(),
            },
        };
        record(ctx, &link.target, &outcome);
        entries.push(LinkEntry { link, outcome });
    }

    Ok(LinkReport {
        template: template.name.clone(),
        entries,
    })
}
