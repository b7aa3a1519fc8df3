//! Implementation of the synchronization phases.
//!
//! ## Overview
//!
//! A synchronization run is built from these phases:
//! 1. Discovery - Walk the root repository and its submodules, depth-first
//! 2. Ordering - Reverse the discovery order so leaves come first
//! 3. Fetch - Fetch every remote into every repository
//! 4. Push - Push candidate branches and tags of one repository to every remote
//!
//! The orchestrator runs fetch and ordered push passes over the nested
//! repositories, then pushes the root last.

use std::path::PathBuf;

pub mod discovery;
pub mod fetch;
pub mod orchestrator;
pub mod ordering;
pub mod push;

/// One repository in a discovered tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle {
    /// Location relative to the root; empty for the root itself
    pub path: PathBuf,
    /// Index of the enclosing repository in the discovery result
    pub parent: Option<usize>,
    /// Nesting level, 0 for the root
    pub depth: usize,
    /// Basename used for exclusion matching
    pub name: String,
}

impl RepoHandle {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Path shown in logs and reports; `.` for the root.
    pub fn display_path(&self) -> String {
        if self.path.as_os_str().is_empty() {
            ".".to_string()
        } else {
            self.path.display().to_string()
        }
    }
}

/// Repositories of one tree in depth-first pre-order
///
/// `repos[0]` is always the root. A handle's parent always has a smaller
/// index than the handle itself.
#[derive(Debug, Clone)]
pub struct RepoTree {
    /// Canonical absolute path of the root working tree
    pub root: PathBuf,
    pub repos: Vec<RepoHandle>,
}

impl RepoTree {
    pub fn root_handle(&self) -> &RepoHandle {
        &self.repos[0]
    }

    /// Every repository except the root, in discovery order.
    pub fn nested(&self) -> &[RepoHandle] {
        &self.repos[1..]
    }

    /// Absolute location of a handle.
    pub fn abs_path(&self, handle: &RepoHandle) -> PathBuf {
        self.root.join(&handle.path)
    }

    /// Indices of the direct children of `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.repos
            .iter()
            .enumerate()
            .filter(move |(_, h)| h.parent == Some(index))
            .map(|(i, _)| i)
    }
}

#[cfg(test)]
impl RepoTree {
    /// Whether `ancestor` encloses `index`, directly or transitively.
    pub fn is_ancestor(&self, ancestor: usize, index: usize) -> bool {
        let mut current = self.repos[index].parent;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.repos[parent].parent;
        }
        false
    }

    /// Find a handle by its root-relative path.
    pub fn find(&self, path: impl AsRef<std::path::Path>) -> Option<usize> {
        let path = path.as_ref();
        self.repos.iter().position(|h| h.path == path)
    }
}

/// Order in which nested repositories are pushed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushOrder {
    /// Indices into `RepoTree::repos`
    pub order: Vec<usize>,
}

impl PushOrder {
    pub fn new(order: Vec<usize>) -> Self {
        Self { order }
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.order.iter().copied()
    }
}
