//! Dotfiles and project template engine.
//!
//! Templates live in a Git repository with two top-level directories:
//! `dotfiles/<name>/` is symlinked into the home directory and
//! `projects/<name>/` is copied into a target directory.
//!
//! The public API is organised into layers:
//!
//! - **[`templates`]** - discover templates and plan their source/target paths
//! - **[`resources`]** - idempotent `apply` primitives (symlinks, checksummed copies)
//! - **[`tasks`]** - install, apply, uninstall and inspect whole templates
//! - **[`repository`]** - keep the local clone of the template repository in sync
//! - **[`commands`]** - top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod operations;
pub mod repository;
pub mod resources;
pub mod tasks;
pub mod templates;
