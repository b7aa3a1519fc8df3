//! Phase 1: Discovery
//!
//! This is the first phase of every run. It turns a root directory into a
//! `RepoTree`: the root repository followed by every nested submodule, to
//! any depth.
//!
//! ## Process
//!
//! 1.  **Root resolution**: The target directory is canonicalized and opened.
//!     A missing or unreadable directory is a `DirectoryAccess` error; a
//!     directory that is not the top level of a repository is a
//!     `NotARepository` error. Both are fatal to the run.
//!
//! 2.  **Depth-first traversal**: Each repository's gitlink entries are
//!     listed (sorted by path) and visited recursively, so a parent always
//!     precedes its children and a child's subtree precedes its next
//!     sibling.
//!
//! 3.  **Initialized check**: A gitlink whose directory is not itself a
//!     repository (an uninitialized submodule) is logged and left out.
//!
//! Discovery only reads repository state, so running it twice on an
//! unchanged tree yields the same sequence.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{RepoHandle, RepoTree};
use crate::error::{Error, Result};
use crate::repository::GitOperations;

/// Executes Phase 1: resolve `root` and discover its repository tree.
pub fn discover(root: &Path, git: &dyn GitOperations) -> Result<RepoTree> {
    let root = resolve_root(root)?;
    discover_from(&root, git)
}

/// Canonicalize the target directory and check it can be entered.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let access_error = |e: std::io::Error| Error::DirectoryAccess {
        path: root.to_path_buf(),
        message: e.to_string(),
    };

    let canonical = fs::canonicalize(root).map_err(access_error)?;
    if !canonical.is_dir() {
        return Err(Error::DirectoryAccess {
            path: root.to_path_buf(),
            message: "not a directory".to_string(),
        });
    }
    fs::read_dir(&canonical).map_err(access_error)?;
    Ok(canonical)
}

/// Discover the tree below an already resolved root.
pub fn discover_from(root: &Path, git: &dyn GitOperations) -> Result<RepoTree> {
    if !git.is_repository_root(root) {
        let message = git
            .toplevel(root)
            .ok()
            .map(|top| format!("top level is {}", top.display()));
        return Err(Error::NotARepository {
            path: root.to_path_buf(),
            message,
        });
    }

    let name = root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string());

    let mut repos = vec![RepoHandle {
        path: PathBuf::new(),
        parent: None,
        depth: 0,
        name,
    }];
    let mut seen = HashSet::new();
    seen.insert(PathBuf::new());

    visit(root, 0, git, &mut repos, &mut seen);

    debug!(
        "Discovered {} repositories under {}",
        repos.len(),
        root.display()
    );
    Ok(RepoTree {
        root: root.to_path_buf(),
        repos,
    })
}

/// Append the submodules of `repos[index]` and their subtrees.
///
/// A repository whose submodules cannot be listed is kept as a leaf; the
/// failure is a warning, not a reason to abandon the rest of the tree.
fn visit(
    root: &Path,
    index: usize,
    git: &dyn GitOperations,
    repos: &mut Vec<RepoHandle>,
    seen: &mut HashSet<PathBuf>,
) {
    let parent_rel = repos[index].path.clone();
    let parent_abs = root.join(&parent_rel);
    let depth = repos[index].depth + 1;

    let submodules = match git.submodule_paths(&parent_abs) {
        Ok(paths) => paths,
        Err(e) => {
            warn!(
                "Cannot list submodules of {}: {}",
                repos[index].display_path(),
                e
            );
            return;
        }
    };

    for sub in submodules {
        let rel = parent_rel.join(&sub);
        if !seen.insert(rel.clone()) {
            continue;
        }
        if !git.is_repository_root(&root.join(&rel)) {
            debug!("Skipping uninitialized submodule {}", rel.display());
            continue;
        }

        let name = rel
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        repos.push(RepoHandle {
            path: rel,
            parent: Some(index),
            depth,
            name,
        });
        let child = repos.len() - 1;
        visit(root, child, git, repos, seen);
    }
}
