//! Path planning and conflict detection.
//!
//! Every planned source is `repo_root/<kind dir>/<name>/<file>` and every
//! target is `base/<file>`, where `base` is the home directory for dotfiles
//! and the target directory for projects.
use std::path::{Path, PathBuf};

use super::{Template, TemplateKind};
use crate::error::TemplateError;
use crate::logging::Log;
use crate::operations::FileSystemOps;
use crate::resources::copy::CopyIntent;
use crate::resources::symlink::PlannedLink;

/// All `(source, target)` pairs for `template`, without touching the filesystem.
fn pairs(
    template: &Template,
    repo_root: &Path,
    base: &Path,
) -> impl Iterator<Item = (PathBuf, PathBuf)> {
    let source_dir = template.source_dir(repo_root);
    template
        .files
        .iter()
        .map(move |file| (source_dir.join(file), base.join(file)))
}

/// Check kind and template directory before planning.
fn check_plannable(
    template: &Template,
    repo_root: &Path,
    kind: TemplateKind,
    fs: &dyn FileSystemOps,
) -> Result<(), TemplateError> {
    template.require_kind(kind)?;
    let dir = template.source_dir(repo_root);
    if fs.exists(&dir) {
        Ok(())
    } else {
        Err(TemplateError::DirectoryNotFound { path: dir })
    }
}

/// Links that would exist if `template` were fully installed into `home`.
///
/// Pure path computation, used by the status inspector.
#[must_use]
pub fn expected_links(template: &Template, repo_root: &Path, home: &Path) -> Vec<PlannedLink> {
    pairs(template, repo_root, home)
        .map(|(source, target)| PlannedLink::new(source, target, &template.name))
        .collect()
}

/// Copies that would be made if every declared file of `template` existed.
#[must_use]
pub fn expected_copies(template: &Template, repo_root: &Path, target_dir: &Path) -> Vec<CopyIntent> {
    pairs(template, repo_root, target_dir)
        .map(|(source, target)| CopyIntent::new(source, target, &template.name))
        .collect()
}

/// Plan the symlinks installing a dotfiles template into `home`.
///
/// Files whose source is missing are dropped with a warning.
///
/// # Errors
///
/// Returns [`TemplateError::WrongKind`] for project templates and
/// [`TemplateError::DirectoryNotFound`] if the template directory is gone.
pub fn plan_dotfile_links(
    template: &Template,
    repo_root: &Path,
    home: &Path,
    fs: &dyn FileSystemOps,
    log: &dyn Log,
) -> Result<Vec<PlannedLink>, TemplateError> {
    check_plannable(template, repo_root, TemplateKind::Dotfiles, fs)?;
    Ok(pairs(template, repo_root, home)
        .filter(|(source, _)| source_present(source, fs, log))
        .map(|(source, target)| PlannedLink::new(source, target, &template.name))
        .collect())
}

/// Plan the copies applying a project template to `target_dir`.
///
/// Files whose source is missing are dropped with a warning.
///
/// # Errors
///
/// Returns [`TemplateError::WrongKind`] for dotfiles templates and
/// [`TemplateError::DirectoryNotFound`] if the template directory is gone.
pub fn plan_project_copies(
    template: &Template,
    repo_root: &Path,
    target_dir: &Path,
    fs: &dyn FileSystemOps,
    log: &dyn Log,
) -> Result<Vec<CopyIntent>, TemplateError> {
    check_plannable(template, repo_root, TemplateKind::Project, fs)?;
    Ok(pairs(template, repo_root, target_dir)
        .filter(|(source, _)| source_present(source, fs, log))
        .map(|(source, target)| CopyIntent::new(source, target, &template.name))
        .collect())
}

fn source_present(source: &Path, fs: &dyn FileSystemOps, log: &dyn Log) -> bool {
    let present = fs.exists(source);
    if !present {
        log.warn(&format!("source file not found: {}", source.display()));
    }
    present
}

/// Declared files of a project template whose source exists and whose target
/// is occupied.
///
/// A target counts as occupied when anything is there, including a dangling
/// symlink, matching what the copier refuses without `force`. Only paths
/// listed in `template.files` are considered; an absent template directory
/// yields no conflicts.
///
/// # Errors
///
/// Returns [`TemplateError::WrongKind`] for dotfiles templates.
pub fn detect_conflicts(
    template: &Template,
    repo_root: &Path,
    target_dir: &Path,
    fs: &dyn FileSystemOps,
) -> Result<Vec<(PathBuf, PathBuf)>, TemplateError> {
    template.require_kind(TemplateKind::Project)?;
    if !fs.exists(&template.source_dir(repo_root)) {
        return Ok(Vec::new());
    }
    Ok(pairs(template, repo_root, target_dir)
        .filter(|(source, target)| fs.exists(source) && fs.entry_exists(target))
        .collect())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::{Level, MemoryLog};
    use crate::operations::MockFileSystemOps;
    use crate::templates::test_helpers::template;

    const REPO: &str = "/repo";
    const HOME: &str = "/home/user";

    fn vim() -> Template {
        template(
            Path::new(REPO),
            TemplateKind::Dotfiles,
            "vim",
            &[".vimrc", ".vim/colors/dark.vim"],
        )
    }

    fn web() -> Template {
        template(
            Path::new(REPO),
            TemplateKind::Project,
            "web",
            &["package.json", "src/index.js"],
        )
    }

    // ---- dotfile links ----

    #[test]
    fn plans_links_under_home() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/dotfiles/vim")
            .with_file("/repo/dotfiles/vim/.vimrc")
            .with_file("/repo/dotfiles/vim/.vim/colors/dark.vim");

        let links =
            plan_dotfile_links(&vim(), Path::new(REPO), Path::new(HOME), &fs, &MemoryLog::new())
                .unwrap();

        assert_eq!(links.len(), 2);
        assert_eq!(links[0].source, PathBuf::from("/repo/dotfiles/vim/.vimrc"));
        assert_eq!(links[0].target, PathBuf::from("/home/user/.vimrc"));
        assert_eq!(links[0].template_name, "vim");
        assert_eq!(
            links[1].target,
            PathBuf::from("/home/user/.vim/colors/dark.vim")
        );
    }

    #[test]
    fn missing_source_is_dropped_with_warning() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/dotfiles/vim")
            .with_file("/repo/dotfiles/vim/.vimrc");
        let log = MemoryLog::new();

        let links = plan_dotfile_links(&vim(), Path::new(REPO), Path::new(HOME), &fs, &log)
            .unwrap();

        assert_eq!(links.len(), 1);
        let warnings = log.messages(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("dark.vim"));
    }

    #[test]
    fn dotfile_plan_rejects_project_template() {
        let fs = MockFileSystemOps::new().with_file("/repo/projects/web");
        let err = plan_dotfile_links(&web(), Path::new(REPO), Path::new(HOME), &fs, &MemoryLog::new())
            .unwrap_err();
        assert!(matches!(err, TemplateError::WrongKind { .. }));
    }

    #[test]
    fn dotfile_plan_requires_template_directory() {
        let fs = MockFileSystemOps::new();
        let err = plan_dotfile_links(&vim(), Path::new(REPO), Path::new(HOME), &fs, &MemoryLog::new())
            .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::DirectoryNotFound { path } if path == Path::new("/repo/dotfiles/vim")
        ));
    }

    #[test]
    fn expected_links_ignore_filesystem_state() {
        let links = expected_links(&vim(), Path::new(REPO), Path::new(HOME));
        assert_eq!(links.len(), 2);
        assert_eq!(links[1].source, PathBuf::from("/repo/dotfiles/vim/.vim/colors/dark.vim"));
    }

    // ---- project copies ----

    #[test]
    fn plans_copies_under_target_dir() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/projects/web")
            .with_file("/repo/projects/web/package.json")
            .with_file("/repo/projects/web/src/index.js");

        let copies = plan_project_copies(
            &web(),
            Path::new(REPO),
            Path::new("/work/app"),
            &fs,
            &MemoryLog::new(),
        )
        .unwrap();

        let targets: Vec<_> = copies.iter().map(|c| c.target.clone()).collect();
        assert_eq!(
            targets,
            vec![
                PathBuf::from("/work/app/package.json"),
                PathBuf::from("/work/app/src/index.js")
            ]
        );
    }

    #[test]
    fn copy_plan_rejects_dotfiles_template() {
        let fs = MockFileSystemOps::new().with_file("/repo/dotfiles/vim");
        let err = plan_project_copies(
            &vim(),
            Path::new(REPO),
            Path::new("/work"),
            &fs,
            &MemoryLog::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TemplateError::WrongKind {
                expected: TemplateKind::Project,
                ..
            }
        ));
    }

    // ---- conflicts ----

    #[test]
    fn conflict_requires_both_source_and_target() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/projects/web")
            .with_file("/repo/projects/web/package.json")
            .with_file("/repo/projects/web/src/index.js")
            .with_file("/work/package.json")
            .with_file("/work/README.md");

        let conflicts = detect_conflicts(&web(), Path::new(REPO), Path::new("/work"), &fs).unwrap();

        assert_eq!(
            conflicts,
            vec![(
                PathBuf::from("/repo/projects/web/package.json"),
                PathBuf::from("/work/package.json")
            )]
        );
    }

    #[test]
    fn dangling_symlink_target_is_a_conflict() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/projects/web")
            .with_file("/repo/projects/web/package.json")
            .with_symlink("/work/package.json", "/nonexistent/x");

        let conflicts = detect_conflicts(&web(), Path::new(REPO), Path::new("/work"), &fs).unwrap();

        assert_eq!(
            conflicts,
            vec![(
                PathBuf::from("/repo/projects/web/package.json"),
                PathBuf::from("/work/package.json")
            )]
        );
    }

    #[test]
    fn missing_source_is_never_a_conflict() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/projects/web")
            .with_file("/work/package.json");
        let conflicts = detect_conflicts(&web(), Path::new(REPO), Path::new("/work"), &fs).unwrap();
        assert!(conflicts.is_empty());
    }

    #[test]
    fn conflicts_are_a_subset_of_the_plan() {
        let fs = MockFileSystemOps::new()
            .with_file("/repo/projects/web")
            .with_file("/repo/projects/web/package.json")
            .with_file("/repo/projects/web/src/index.js")
            .with_file("/work/package.json")
            .with_file("/work/src/index.js");
        let log = MemoryLog::new();

        let plan =
            plan_project_copies(&web(), Path::new(REPO), Path::new("/work"), &fs, &log).unwrap();
        let conflicts = detect_conflicts(&web(), Path::new(REPO), Path::new("/work"), &fs).unwrap();

        assert_eq!(conflicts.len(), 2);
        for (source, target) in &conflicts {
            assert!(
                plan.iter().any(|c| &c.source == source && &c.target == target),
                "{} not planned",
                target.display()
            );
        }
    }

    #[test]
    fn conflicts_empty_when_template_directory_missing() {
        let fs = MockFileSystemOps::new().with_file("/work/package.json");
        let conflicts = detect_conflicts(&web(), Path::new(REPO), Path::new("/work"), &fs).unwrap();
        assert!(conflicts.is_empty());
    }
}
