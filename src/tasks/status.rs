//! Link status inspection for dotfiles templates.
use std::path::Path;

use serde::Serialize;

use super::Context;
use crate::error::TemplateError;
use crate::resources::symlink::{LinkStatus, PlannedLink};
use crate::templates::{Template, TemplateKind, expected_links};

/// One expected link and its current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatusEntry {
    /// The expected link.
    #[serde(flatten)]
    pub link: PlannedLink,
    /// Its classification.
    #[serde(flatten)]
    pub status: LinkStatus,
}

/// Status of every declared file of a dotfiles template.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateStatus {
    /// Template name.
    pub name: String,
    /// Template description.
    pub description: String,
    /// One entry per declared file, in template order.
    pub links: Vec<LinkStatusEntry>,
}

impl TemplateStatus {
    /// Number of links that are correctly in place.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.links
            .iter()
            .filter(|e| e.status == LinkStatus::Ok)
            .count()
    }

    /// Number of declared links.
    #[must_use]
    pub fn total(&self) -> usize {
        self.links.len()
    }

    /// `true` when every declared link is in place.
    #[must_use]
    pub fn is_fully_installed(&self) -> bool {
        self.total() > 0 && self.active_count() == self.total()
    }
}

/// Classify each expected link of `template` under `ctx.home`.
///
/// Read-only; the template directory does not need to exist.
///
/// # Errors
///
/// Returns [`TemplateError::WrongKind`] for project templates.
pub fn template_status(
    ctx: &Context,
    template: &Template,
    repo_root: &Path,
) -> Result<TemplateStatus, TemplateError> {
    template.require_kind(TemplateKind::Dotfiles)?;
    let links = expected_links(template, repo_root, &ctx.home)
        .into_iter()
        .map(|link| {
            let status = link.status(ctx.fs_ops.as_ref());
            LinkStatusEntry { link, status }
        })
        .collect();
    Ok(TemplateStatus {
        name: template.name.clone(),
        description: template.description.clone(),
        links,
    })
}
