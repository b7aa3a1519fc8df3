//! Read-only view of a repository's local state.
//!
//! The pusher asks three questions before touching a repository: does a
//! local branch exist, are tracked files unmodified, and which branch is
//! checked out. None of them consult a remote or change anything.

use std::path::Path;

use crate::error::Result;
use crate::repository::GitOperations;

/// Queries local repository state through a `GitOperations` implementation
#[derive(Clone, Copy)]
pub struct StateInspector<'a> {
    git: &'a dyn GitOperations,
}

impl<'a> StateInspector<'a> {
    pub fn new(git: &'a dyn GitOperations) -> Self {
        Self { git }
    }

    /// True iff a local branch named `name` exists.
    pub fn ref_exists(&self, repo: &Path, name: &str) -> Result<bool> {
        self.git.branch_exists(repo, name)
    }

    /// True iff there are no staged or unstaged modifications to tracked
    /// files. Untracked files do not make a repository dirty: this answers
    /// "is it safe to switch branches", not "is the tree pristine".
    pub fn is_clean(&self, repo: &Path) -> Result<bool> {
        self.git.is_clean(repo)
    }

    /// The checked-out branch, or `None` when HEAD is detached.
    ///
    /// Callers that need to restore the prior checkout must treat `None` as
    /// a hard stop.
    pub fn current_branch(&self, repo: &Path) -> Result<Option<String>> {
        self.git.current_branch(repo)
    }
}
