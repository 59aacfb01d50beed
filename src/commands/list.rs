//! Command: list templates in the repository.
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use serde::Serialize;

use super::{CommandSetup, Terminal};
use crate::cli::{GlobalOpts, ListOpts};
use crate::config::OutputFormat;
use crate::logging::Logger;
use crate::repository::RepositorySync;
use crate::templates::{Template, TemplateKind, discover_templates};

/// Run the list command.
///
/// # Errors
///
/// Returns an error if the repository cannot be resolved or the pattern is
/// not a valid glob.
pub fn run(
    global: &GlobalOpts,
    opts: &ListOpts,
    log: &Arc<Logger>,
    sync: &dyn RepositorySync,
    term: &mut Terminal<'_>,
) -> Result<()> {
    let setup = CommandSetup::init(global)?;
    let root = setup.repository(sync, log.as_ref())?;
    let templates = discover_templates(&root, log.as_ref());
    let selected = filter(&templates, opts)?;

    match setup.format {
        OutputFormat::Text => term.print(&render_text(&selected, opts)),
        OutputFormat::Json => term.json(&ListOutput::new(&selected, opts.detailed)),
    }
}

/// Apply the `--type` filter and the name pattern.
///
/// # Errors
///
/// Returns an error if the pattern is not a valid glob.
pub fn filter<'a>(templates: &'a [Template], opts: &ListOpts) -> Result<Vec<&'a Template>> {
    let pattern = opts
        .pattern
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .context("invalid template name pattern")?;
    Ok(templates
        .iter()
        .filter(|t| opts.kind.matches(t.kind))
        .filter(|t| pattern.as_ref().is_none_or(|p| p.matches(&t.name)))
        .collect())
}

/// Human-readable listing grouped by kind.
#[must_use]
pub fn render_text(templates: &[&Template], opts: &ListOpts) -> String {
    let mut out = String::new();
    if templates.is_empty() {
        out.push_str("No templates found");
        if let Some(pattern) = &opts.pattern {
            let _ = write!(out, " matching '{pattern}'");
        }
        out.push('\n');
        return out;
    }

    out.push_str("Available templates:\n");
    for kind in TemplateKind::ALL {
        let group: Vec<&&Template> = templates.iter().filter(|t| t.kind == kind).collect();
        if group.is_empty() {
            continue;
        }
        let _ = write!(out, "\n{}/\n", kind.dir_name());
        for t in group {
            if opts.detailed {
                render_detailed(&mut out, t);
            } else {
                let script = if t.install_script.is_some() {
                    " (with install.sh)"
                } else {
                    ""
                };
                let _ = writeln!(out, "  {} - {}{script}", t.name, t.description);
            }
        }
    }
    let noun = if templates.len() == 1 {
        "template"
    } else {
        "templates"
    };
    let _ = write!(out, "\nTotal: {} {noun}\n", templates.len());
    out
}

fn render_detailed(out: &mut String, t: &Template) {
    let _ = writeln!(out, "  {}", t.name);
    let _ = writeln!(out, "    description: {}", t.description);
    let _ = writeln!(out, "    files: {}", t.files.len());
    if let Some(script) = &t.install_script {
        let _ = writeln!(out, "    install script: {}", script.display());
    }
}

/// JSON document printed by `list --format json`.
#[derive(Debug, Serialize)]
pub struct ListOutput<'a> {
    /// Selected templates.
    pub templates: Vec<TemplateSummary<'a>>,
}

impl<'a> ListOutput<'a> {
    /// Summarize `templates`; `detailed` adds file lists and metadata.
    #[must_use]
    pub fn new(templates: &[&'a Template], detailed: bool) -> Self {
        Self {
            templates: templates
                .iter()
                .map(|t| TemplateSummary {
                    name: &t.name,
                    kind: t.kind,
                    description: &t.description,
                    files_count: t.files.len(),
                    has_install_script: t.install_script.is_some(),
                    files: detailed.then_some(t.files.as_slice()),
                    metadata: detailed.then_some(&t.metadata),
                })
                .collect(),
        }
    }
}

/// One template in [`ListOutput`].
#[derive(Debug, Serialize)]
pub struct TemplateSummary<'a> {
    /// Template name.
    pub name: &'a str,
    /// Template kind.
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    /// Description.
    pub description: &'a str,
    /// Number of template files.
    pub files_count: usize,
    /// Whether an install script exists.
    pub has_install_script: bool,
    /// Relative file paths (detailed only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<&'a [PathBuf]>,
    /// Raw metadata (detailed only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a BTreeMap<String, toml::Value>>,
}
