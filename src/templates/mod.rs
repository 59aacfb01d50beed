//! Template catalog: discovery, path planning and conflict detection.
//!
//! A repository holds two kinds of templates side by side:
//!
//! ```text
//! <repo>/
//! ├── dotfiles/<name>/...   symlinked into the user's home directory
//! └── projects/<name>/...   copied into a target directory
//! ```
//!
//! [`discover_templates`] builds the catalog, [`plan`] turns a [`Template`]
//! into concrete source/target pairs.
pub mod discovery;
pub mod plan;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{TemplateError, ValidationError};

pub use discovery::discover_templates;
pub use plan::{
    detect_conflicts, expected_copies, expected_links, plan_dotfile_links, plan_project_copies,
};

/// File inside a template root that is run after materialization.
pub const INSTALL_SCRIPT_NAME: &str = "install.sh";

/// Sidecar file holding template metadata.
pub const METADATA_FILE_NAME: &str = "metadata.toml";

/// Which materialization strategy a template uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    /// Symlinked into the home directory.
    Dotfiles,
    /// Copied into a target directory.
    Project,
}

impl TemplateKind {
    /// All kinds, in catalog order.
    pub const ALL: [Self; 2] = [Self::Dotfiles, Self::Project];

    /// Name of the repository subdirectory holding templates of this kind.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Dotfiles => "dotfiles",
            Self::Project => "projects",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dotfiles => "dotfiles",
            Self::Project => "project",
        })
    }
}

/// A discovered unit of installable content.
///
/// Created fresh on every scan and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Template {
    /// Directory name of the template.
    pub name: String,
    /// `description` from the metadata sidecar, or a placeholder.
    pub description: String,
    /// Fixed by the parent directory the template was found under.
    #[serde(rename = "type")]
    pub kind: TemplateKind,
    /// Files relative to the template root, in traversal order.
    pub files: Vec<PathBuf>,
    /// Post-materialization script, relative to the template root.
    pub install_script: Option<PathBuf>,
    /// Every key of the metadata sidecar, verbatim.
    pub metadata: BTreeMap<String, toml::Value>,
    /// When the scan that produced this record ran.
    pub discovered_at: DateTime<Utc>,
    /// Absolute path of the template directory.
    #[serde(skip)]
    pub root_path: PathBuf,
}

impl Template {
    /// Placeholder used when no metadata description exists.
    #[must_use]
    pub fn default_description(name: &str) -> String {
        format!("Template {name}")
    }

    /// Check name, file list and install script path.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)?;
        if self.files.is_empty() {
            return Err(ValidationError::NoFiles);
        }
        for file in &self.files {
            if file.as_os_str().is_empty() {
                return Err(ValidationError::EmptyPath);
            }
            if file.is_absolute() {
                return Err(ValidationError::AbsolutePath(file.display().to_string()));
            }
        }
        if let Some(script) = &self.install_script
            && script.is_absolute()
        {
            return Err(ValidationError::AbsoluteInstallScript(
                script.display().to_string(),
            ));
        }
        Ok(())
    }

    /// Directory of this template inside `repo_root`.
    #[must_use]
    pub fn source_dir(&self, repo_root: &Path) -> PathBuf {
        repo_root.join(self.kind.dir_name()).join(&self.name)
    }

    /// Absolute install script path, re-checked against the filesystem.
    ///
    /// Returns `None` if no script was discovered or it has since vanished.
    #[must_use]
    pub fn install_script_path(&self) -> Option<PathBuf> {
        let script = self.root_path.join(self.install_script.as_ref()?);
        script.is_file().then_some(script)
    }

    /// Fail with [`TemplateError::WrongKind`] unless this template is `expected`.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind differs.
    pub fn require_kind(&self, expected: TemplateKind) -> Result<(), TemplateError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(TemplateError::WrongKind {
                name: self.name.clone(),
                expected,
                actual: self.kind,
            })
        }
    }

    /// Equality on every field except `discovered_at`.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.kind == other.kind
            && self.files == other.files
            && self.install_script == other.install_script
            && self.metadata == other.metadata
            && self.root_path == other.root_path
    }
}

/// Validate a template name: `[A-Za-z0-9._-]+`, no leading or trailing dot.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] or [`ValidationError::DottedName`].
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');
    if name.is_empty() || !name.chars().all(allowed) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Err(ValidationError::DottedName(name.to_string()));
    }
    Ok(())
}

/// Look up a template by name, optionally restricted to one kind.
///
/// # Errors
///
/// Returns [`TemplateError::NotFound`] listing the available names.
pub fn find_template<'a>(
    templates: &'a [Template],
    name: &str,
    kind: Option<TemplateKind>,
) -> Result<&'a Template, TemplateError> {
    let candidates = || {
        templates
            .iter()
            .filter(move |t| kind.is_none_or(|k| t.kind == k))
    };
    candidates().find(|t| t.name == name).ok_or_else(|| {
        let mut available: Vec<String> = candidates().map(|t| t.name.clone()).collect();
        available.sort();
        TemplateError::NotFound {
            name: name.to_string(),
            available,
        }
    })
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod test_helpers {
    use super::*;

    /// Build a template rooted at `repo/<kind dir>/<name>` without touching disk.
    pub fn template(repo: &Path, kind: TemplateKind, name: &str, files: &[&str]) -> Template {
        Template {
            name: name.to_string(),
            description: Template::default_description(name),
            kind,
            files: files.iter().map(PathBuf::from).collect(),
            install_script: None,
            metadata: BTreeMap::new(),
            discovered_at: Utc::now(),
            root_path: repo.join(kind.dir_name()).join(name),
        }
    }
}
