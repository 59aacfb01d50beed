//! Local cache of the template repository, kept in sync with `git2`.
use std::path::{Path, PathBuf};

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{AnnotatedCommit, Repository};
use serde::Serialize;

use crate::error::RepositoryError;

/// What a sync did to the local cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncChange {
    /// The repository was cloned fresh.
    Cloned,
    /// Nothing new on the remote.
    UpToDate,
    /// The branch moved forward (or was checked out for the first time).
    Updated,
    /// Diverged history was discarded in favour of the remote.
    Reset,
    /// The URL names a local directory that is used in place.
    Local,
}

/// Result of [`RepositorySync::ensure_repo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Working tree of the cached clone.
    pub path: PathBuf,
    /// What changed.
    pub change: SyncChange,
}

/// Brings a local clone of the template repository up to date.
#[cfg_attr(test, mockall::automock)]
pub trait RepositorySync {
    /// Clone `url` into `cache_dir` or update the existing clone to the tip
    /// of `origin/<branch>`.
    ///
    /// With `force`, local history that cannot be fast-forwarded is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns a [`RepositoryError`] if cloning or fetching fails, or if the
    /// branch diverged and `force` is not set.
    fn ensure_repo(
        &self,
        url: &str,
        branch: &str,
        cache_dir: &Path,
        force: bool,
    ) -> Result<SyncReport, RepositoryError>;
}

/// [`RepositorySync`] backed by libgit2.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitSync;

impl RepositorySync for GitSync {
    fn ensure_repo(
        &self,
        url: &str,
        branch: &str,
        cache_dir: &Path,
        force: bool,
    ) -> Result<SyncReport, RepositoryError> {
        let change = if cache_dir.join(".git").exists() {
            update(branch, cache_dir, force)?
        } else {
            clone(url, branch, cache_dir)?;
            SyncChange::Cloned
        };
        tracing::debug!(path = %cache_dir.display(), ?change, "repository synced");
        Ok(SyncReport {
            path: cache_dir.to_path_buf(),
            change,
        })
    }
}

fn clone(url: &str, branch: &str, cache_dir: &Path) -> Result<(), RepositoryError> {
    if let Some(parent) = cache_dir.parent() {
        std::fs::create_dir_all(parent).map_err(|source| RepositoryError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    RepoBuilder::new()
        .branch(branch)
        .clone(url, cache_dir)
        .map_err(|source| RepositoryError::Clone {
            url: url.to_string(),
            source,
        })?;
    Ok(())
}

fn update(branch: &str, cache_dir: &Path, force: bool) -> Result<SyncChange, RepositoryError> {
    let git = |source: git2::Error| RepositoryError::Sync {
        path: cache_dir.to_path_buf(),
        source,
    };

    let repo = Repository::open(cache_dir).map_err(git)?;
    let refspec = format!("+refs/heads/{branch}:refs/remotes/origin/{branch}");
    repo.find_remote("origin")
        .and_then(|mut remote| remote.fetch(&[refspec.as_str()], None, None))
        .map_err(git)?;

    let fetched = repo
        .find_reference(&format!("refs/remotes/origin/{branch}"))
        .and_then(|r| repo.reference_to_annotated_commit(&r))
        .map_err(git)?;

    let local_ref = format!("refs/heads/{branch}");
    let change = match repo.find_reference(&local_ref) {
        Ok(local) => {
            let (analysis, _) = repo
                .merge_analysis_for_ref(&local, &[&fetched])
                .map_err(git)?;
            if analysis.is_up_to_date() {
                SyncChange::UpToDate
            } else if analysis.is_fast_forward() {
                SyncChange::Updated
            } else if force {
                SyncChange::Reset
            } else {
                return Err(RepositoryError::Diverged {
                    branch: branch.to_string(),
                });
            }
        }
        Err(_) => SyncChange::Updated,
    };

    let on_branch = repo
        .head()
        .ok()
        .is_some_and(|head| head.name() == Some(local_ref.as_str()));
    if change != SyncChange::UpToDate || !on_branch {
        move_branch(&repo, &local_ref, &fetched).map_err(git)?;
    }
    Ok(change)
}

/// Point `local_ref` at `commit`, make it HEAD and check it out.
fn move_branch(
    repo: &Repository,
    local_ref: &str,
    commit: &AnnotatedCommit<'_>,
) -> Result<(), git2::Error> {
    repo.reference(local_ref, commit.id(), true, "dotforge: sync")?;
    repo.set_head(local_ref)?;
    repo.checkout_head(Some(CheckoutBuilder::new().force()))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use git2::{Commit, RepositoryInitOptions, Signature};

    fn init_origin(dir: &Path) -> Repository {
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        Repository::init_opts(dir, &opts).unwrap()
    }

    fn commit_file(repo: &Repository, rel: &str, content: &str) {
        let workdir = repo.workdir().unwrap().to_path_buf();
        let path = workdir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(rel)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&Commit<'_>> = parent.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, "update", &tree, &parents)
            .unwrap();
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        origin: Repository,
        url: String,
        cache: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let origin_path = dir.path().join("origin");
            let origin = init_origin(&origin_path);
            commit_file(&origin, "dotfiles/vim/.vimrc", "set number\n");
            Self {
                url: origin_path.to_string_lossy().into_owned(),
                cache: dir.path().join("config/repos/origin"),
                origin,
                _dir: dir,
            }
        }

        fn sync(&self, force: bool) -> Result<SyncReport, RepositoryError> {
            GitSync.ensure_repo(&self.url, "main", &self.cache, force)
        }

        fn cached(&self, rel: &str) -> String {
            std::fs::read_to_string(self.cache.join(rel)).unwrap()
        }
    }

    #[test]
    fn first_sync_clones() {
        let fx = Fixture::new();

        let report = fx.sync(false).unwrap();

        assert_eq!(report.change, SyncChange::Cloned);
        assert_eq!(report.path, fx.cache);
        assert_eq!(fx.cached("dotfiles/vim/.vimrc"), "set number\n");
    }

    #[test]
    fn second_sync_is_up_to_date() {
        let fx = Fixture::new();
        fx.sync(false).unwrap();
        assert_eq!(fx.sync(false).unwrap().change, SyncChange::UpToDate);
    }

    #[test]
    fn new_remote_commit_fast_forwards() {
        let fx = Fixture::new();
        fx.sync(false).unwrap();
        commit_file(&fx.origin, "dotfiles/vim/.vimrc", "set relativenumber\n");

        assert_eq!(fx.sync(false).unwrap().change, SyncChange::Updated);
        assert_eq!(fx.cached("dotfiles/vim/.vimrc"), "set relativenumber\n");
    }

    #[test]
    fn diverged_history_requires_force() {
        let fx = Fixture::new();
        fx.sync(false).unwrap();
        let cache_repo = Repository::open(&fx.cache).unwrap();
        commit_file(&cache_repo, "local.txt", "local\n");
        commit_file(&fx.origin, "remote.txt", "remote\n");

        let err = fx.sync(false).unwrap_err();
        assert!(matches!(err, RepositoryError::Diverged { .. }), "got {err:?}");

        assert_eq!(fx.sync(true).unwrap().change, SyncChange::Reset);
        assert_eq!(fx.cached("remote.txt"), "remote\n");
    }

    #[test]
    fn missing_branch_fails_clone() {
        let fx = Fixture::new();
        let err = GitSync
            .ensure_repo(&fx.url, "no-such-branch", &fx.cache, false)
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Clone { .. }));
    }
}
