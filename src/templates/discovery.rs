//! Catalog builder: scan a repository for templates.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use super::{INSTALL_SCRIPT_NAME, METADATA_FILE_NAME, Template, TemplateKind};
use crate::logging::Log;

/// Scan `repo_root/dotfiles/*` and `repo_root/projects/*` for templates.
///
/// Never fails: a missing kind directory yields no templates of that kind,
/// and a template directory that cannot be read or fails validation is
/// logged and skipped. Results are grouped by kind, sorted by name within
/// each kind.
#[must_use]
pub fn discover_templates(repo_root: &Path, log: &dyn Log) -> Vec<Template> {
    let scanned_at = Utc::now();
    let mut templates = Vec::new();

    for kind in TemplateKind::ALL {
        let kind_dir = repo_root.join(kind.dir_name());
        if !kind_dir.is_dir() {
            log.debug(&format!("no {} directory in {}", kind.dir_name(), repo_root.display()));
            continue;
        }

        let entries = match std::fs::read_dir(&kind_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log.error(&format!("cannot read {}: {e}", kind_dir.display()));
                continue;
            }
        };

        let mut dirs: Vec<(String, PathBuf)> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| {
                let name = e.file_name().to_str()?.to_string();
                (!name.starts_with('.')).then(|| (name, e.path()))
            })
            .collect();
        dirs.sort();

        for (name, dir) in dirs {
            match scan_template(&name, &dir, kind, scanned_at, log) {
                Some(template) => templates.push(template),
                None => log.debug(&format!("skipping {kind} template directory {name}")),
            }
        }
    }

    log.debug(&format!(
        "discovered {} templates in {}",
        templates.len(),
        repo_root.display()
    ));
    templates
}

/// Build one template from its directory, or `None` if it must be skipped.
fn scan_template(
    name: &str,
    dir: &Path,
    kind: TemplateKind,
    scanned_at: DateTime<Utc>,
    log: &dyn Log,
) -> Option<Template> {
    let mut files = Vec::new();
    let mut install_script: Option<(usize, PathBuf)> = None;

    for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log.error(&format!("failed to enumerate template {name}: {e}"));
                return None;
            }
        };
        // Symlinked files count as files, as with `Path::is_file`.
        if !entry.path().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let file_name = entry.file_name();
        if file_name == INSTALL_SCRIPT_NAME {
            // The shallowest script wins.
            if install_script
                .as_ref()
                .is_none_or(|(depth, _)| entry.depth() < *depth)
            {
                install_script = Some((entry.depth(), relative.to_path_buf()));
            }
        } else if file_name != METADATA_FILE_NAME {
            files.push(relative.to_path_buf());
        }
    }

    let metadata = load_metadata(name, dir, log);
    let description = metadata
        .get("description")
        .and_then(toml::Value::as_str)
        .map_or_else(|| Template::default_description(name), String::from);

    let template = Template {
        name: name.to_string(),
        description,
        kind,
        files,
        install_script: install_script.map(|(_, path)| path),
        metadata,
        discovered_at: scanned_at,
        root_path: dir.to_path_buf(),
    };

    match template.validate() {
        Ok(()) => Some(template),
        Err(e) => {
            log.debug(&format!("template {name} is invalid: {e}"));
            None
        }
    }
}

/// Parse `metadata.toml` in the template root; empty on absence or error.
fn load_metadata(name: &str, dir: &Path, log: &dyn Log) -> BTreeMap<String, toml::Value> {
    let path = dir.join(METADATA_FILE_NAME);
    if !path.is_file() {
        return BTreeMap::new();
    }
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|content| toml::from_str::<toml::Table>(&content).map_err(|e| e.to_string()));
    match parsed {
        Ok(table) => table.into_iter().collect(),
        Err(e) => {
            log.warn(&format!("failed to parse metadata for {name}: {e}"));
            BTreeMap::new()
        }
    }
}
