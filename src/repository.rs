//! # Version-Control Capability
//!
//! This module defines `GitOperations`, the seam between the synchronization
//! engine and the version-control tool it drives. The engine never runs git
//! itself: tree discovery, the state inspector and the pusher all go through
//! this trait.
//!
//! ## Design
//!
//! - **`GitOperations`**: Every query and mutation the engine needs, each
//!   taking the absolute path of the repository it applies to.
//!
//! - **`DefaultGitOperations`**: The production implementation, a thin
//!   adapter over the functions in [`crate::git`], which shell out to the
//!   system `git` binary.
//!
//! Tests substitute an in-memory implementation to simulate trees, missing
//! branches, dirty working trees and rejected pushes without touching disk
//! or network.

use std::path::{Path, PathBuf};

use crate::error::Result;

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Canonical top level of the working tree containing `dir`.
    fn toplevel(&self, dir: &Path) -> Result<PathBuf>;

    /// Paths (relative to `repo`) of the submodules recorded in `repo`.
    fn submodule_paths(&self, repo: &Path) -> Result<Vec<PathBuf>>;

    /// Names of the remotes configured on `repo`.
    fn remotes(&self, repo: &Path) -> Result<Vec<String>>;

    /// Whether a local branch named `branch` exists.
    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool>;

    /// Whether tracked files are unmodified, staged or not.
    fn is_clean(&self, repo: &Path) -> Result<bool>;

    /// Checked-out branch, `None` when detached.
    fn current_branch(&self, repo: &Path) -> Result<Option<String>>;

    fn checkout(&self, repo: &Path, branch: &str) -> Result<()>;

    fn fetch(&self, repo: &Path, remote: &str) -> Result<()>;

    fn push_branch(&self, repo: &Path, remote: &str, branch: &str) -> Result<()>;

    fn push_tags(&self, repo: &Path, remote: &str) -> Result<()>;

    /// Whether `dir` is itself the top level of a repository, as opposed to
    /// a plain directory or a subdirectory of one.
    fn is_repository_root(&self, dir: &Path) -> bool {
        match (self.toplevel(dir), std::fs::canonicalize(dir)) {
            (Ok(top), Ok(dir)) => top == dir,
            _ => false,
        }
    }
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn toplevel(&self, dir: &Path) -> Result<PathBuf> {
        crate::git::toplevel(dir)
    }

    fn submodule_paths(&self, repo: &Path) -> Result<Vec<PathBuf>> {
        crate::git::submodule_paths(repo)
    }

    fn remotes(&self, repo: &Path) -> Result<Vec<String>> {
        crate::git::remotes(repo)
    }

    fn branch_exists(&self, repo: &Path, branch: &str) -> Result<bool> {
        crate::git::branch_exists(repo, branch)
    }

    fn is_clean(&self, repo: &Path) -> Result<bool> {
        crate::git::is_clean(repo)
    }

    fn current_branch(&self, repo: &Path) -> Result<Option<String>> {
        crate::git::current_branch(repo)
    }

    fn checkout(&self, repo: &Path, branch: &str) -> Result<()> {
        crate::git::checkout(repo, branch)
    }

    fn fetch(&self, repo: &Path, remote: &str) -> Result<()> {
        crate::git::fetch(repo, remote)
    }

    fn push_branch(&self, repo: &Path, remote: &str, branch: &str) -> Result<()> {
        crate::git::push_branch(repo, remote, branch)
    }

    fn push_tags(&self, repo: &Path, remote: &str) -> Result<()> {
        crate::git::push_tags(repo, remote)
    }
}
