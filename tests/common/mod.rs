// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed template repository with a separate
// home directory and work directory, so each integration test can set up an
// isolated environment without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dotforge_cli::logging::{Log, MemoryLog};
use dotforge_cli::tasks::Context;
use dotforge_cli::templates::{Template, TemplateKind, discover_templates, find_template};

/// An isolated template repository backed by a [`tempfile::TempDir`].
///
/// ```text
/// <tmp>/repo/dotfiles/...
/// <tmp>/repo/projects/...
/// <tmp>/home/
/// <tmp>/work/
/// ```
pub struct TestRepo {
    _dir: tempfile::TempDir,
    pub root: PathBuf,
    pub home: PathBuf,
    pub work: PathBuf,
    pub log: Arc<MemoryLog>,
}

impl TestRepo {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let root = dir.path().join("repo");
        let home = dir.path().join("home");
        let work = dir.path().join("work");
        for d in [&root, &home, &work] {
            std::fs::create_dir_all(d).expect("create fixture dir");
        }
        Self {
            _dir: dir,
            root,
            home,
            work,
            log: Arc::new(MemoryLog::new()),
        }
    }

    /// Write `content` to `<kind dir>/<template>/<rel>`.
    pub fn file(&self, kind: TemplateKind, template: &str, rel: &str, content: &str) -> &Self {
        write(
            &self.root.join(kind.dir_name()).join(template).join(rel),
            content,
        );
        self
    }

    pub fn dotfile(&self, template: &str, rel: &str, content: &str) -> &Self {
        self.file(TemplateKind::Dotfiles, template, rel, content)
    }

    pub fn project_file(&self, template: &str, rel: &str, content: &str) -> &Self {
        self.file(TemplateKind::Project, template, rel, content)
    }

    /// The `vim-config` dotfiles template used across tests.
    pub fn with_vim_config(&self) -> &Self {
        self.dotfile(
            "vim-config",
            "metadata.toml",
            "description = \"Vim configuration\"\n",
        )
        .dotfile("vim-config", ".vimrc", "set number\n")
        .dotfile("vim-config", ".vim/colors/dark.vim", "hi Normal ctermbg=0\n")
    }

    /// The `test-project` project template used across tests.
    pub fn with_test_project(&self) -> &Self {
        self.project_file("test-project", "README.md", "# Test project\n")
            .project_file("test-project", "src/main.py", "print('hello')\n")
            .project_file("test-project", "install.sh", "touch installed\n")
    }

    pub fn templates(&self) -> Vec<Template> {
        discover_templates(&self.root, self.log.as_ref())
    }

    pub fn template(&self, name: &str) -> Template {
        find_template(&self.templates(), name, None)
            .expect("template exists")
            .clone()
    }

    pub fn context(&self) -> Context {
        Context::new(Arc::clone(&self.log) as Arc<dyn Log>, self.home.clone())
    }

    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.home.join(rel)
    }

    pub fn work_path(&self, rel: &str) -> PathBuf {
        self.work.join(rel)
    }
}

pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write fixture file");
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read file")
}
