//! Orchestrator for a complete synchronization run
//!
//! This module coordinates the phases into the single "synchronize tree"
//! operation:
//!
//! 1. Discover the tree and compute the push order
//! 2. Fetch every remote into every repository
//! 3. Push every nested repository, leaves first
//! 4. Repeat 2-3 for the configured number of passes
//! 5. Push the root repository
//!
//! A second pass exists because a submodule pointer commit in one nested
//! repository may only become pushable once a sibling embedding the same
//! submodule has pushed it. With the default `min_passes = max_passes = 2`
//! exactly two passes run. A larger `max_passes` keeps running passes after
//! `min_passes` until two consecutive passes produce the same outcomes.
//!
//! Only discovery errors are returned; every fetch and push failure ends up
//! in the `SyncReport`.

use std::path::Path;

use log::{info, warn};
use serde::Serialize;

use super::push::{select_remotes, Pusher};
use super::{discovery, fetch, ordering, PushOrder, RepoTree};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::report::{PassReport, RepoReport, SyncReport};
use crate::repository::GitOperations;

/// Drives synchronization runs with a fixed configuration
pub struct Orchestrator<'a> {
    git: &'a dyn GitOperations,
    config: SyncConfig,
}

/// What a run would attempt, without fetching or pushing
#[derive(Debug, Clone, Serialize)]
pub struct SyncPlan {
    pub root: String,
    pub remotes: Vec<String>,
    /// Repositories in push order, root last
    pub steps: Vec<PlannedPush>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedPush {
    pub path: String,
    pub excluded: bool,
    /// `(remote, branch)` pairs that exist and would be pushed
    pub pushes: Vec<(String, String)>,
}

impl<'a> Orchestrator<'a> {
    pub fn new(git: &'a dyn GitOperations, config: SyncConfig) -> Self {
        Self { git, config }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Discover the tree at `root` and synchronize it.
    pub fn synchronize(&self, root: &Path) -> Result<SyncReport> {
        let tree = discovery::discover(root, self.git)?;
        Ok(self.synchronize_tree(&tree))
    }

    /// Synchronize an already discovered tree.
    pub fn synchronize_tree(&self, tree: &RepoTree) -> SyncReport {
        let remotes = self.select_remotes(tree);
        let order = ordering::execute(tree);
        let pusher = Pusher::new(self.git, &self.config, &remotes);

        info!(
            "Synchronizing {} ({} nested repositories) with remotes [{}]",
            tree.root.display(),
            order.len(),
            remotes.join(", ")
        );

        let mut passes: Vec<PassReport> = Vec::new();
        let mut converged = false;
        for number in 1..=self.config.max_passes {
            if number > self.config.min_passes && converged {
                break;
            }
            info!("Pass {}: fetching", number);
            let fetches = fetch::execute(tree, self.git, &self.config, &remotes);

            info!("Pass {}: pushing nested repositories", number);
            let repos = self.push_in_order(tree, &order, &pusher);

            let pass = PassReport {
                number,
                fetches,
                repos,
            };
            converged = passes
                .last()
                .is_some_and(|previous| previous.signature() == pass.signature());
            passes.push(pass);
        }

        info!("Pushing root repository");
        let root = tree.root_handle();
        let root_push = pusher.push(&tree.root, &root.display_path(), &root.name);

        let report = SyncReport {
            root: tree.root.display().to_string(),
            remotes,
            passes,
            root_push,
            converged,
        };
        let summary = report.summary();
        info!(
            "Done: {} pushed, {} skipped, {} failed",
            summary.pushed,
            summary.skipped,
            summary.failures()
        );
        report
    }

    /// Discover the tree at `root` and describe what a run would push.
    pub fn plan(&self, root: &Path) -> Result<SyncPlan> {
        let tree = discovery::discover(root, self.git)?;
        let remotes = self.select_remotes(&tree);
        let order = ordering::execute(&tree);

        let steps = order
            .iter()
            .chain(std::iter::once(0))
            .map(|index| {
                let handle = &tree.repos[index];
                let path = tree.abs_path(handle);
                let excluded = self.config.is_excluded(&handle.name);
                let mut pushes = Vec::new();
                let display = handle.display_path();
                if !excluded {
                    let available = self.git.remotes(&path).unwrap_or_else(|e| {
                        warn!("{}: cannot list remotes: {}", display, e);
                        Vec::new()
                    });
                    for remote in select_remotes(&remotes, &available, &display) {
                        for branch in &self.config.branch_candidates {
                            match self.git.branch_exists(&path, branch) {
                                Ok(true) => pushes.push((remote.clone(), branch.clone())),
                                Ok(false) => {}
                                Err(e) => {
                                    warn!("{}: cannot check branch {}: {}", display, branch, e)
                                }
                            }
                        }
                    }
                }
                PlannedPush {
                    path: display,
                    excluded,
                    pushes,
                }
            })
            .collect();

        Ok(SyncPlan {
            root: tree.root.display().to_string(),
            remotes,
            steps,
        })
    }

    /// The configured remote list, or every remote of the root.
    fn select_remotes(&self, tree: &RepoTree) -> Vec<String> {
        if let Some(remotes) = &self.config.remotes {
            return remotes.clone();
        }
        self.git.remotes(&tree.root).unwrap_or_else(|e| {
            warn!("Cannot list remotes of the root repository: {}", e);
            Vec::new()
        })
    }

    fn push_in_order(
        &self,
        tree: &RepoTree,
        order: &PushOrder,
        pusher: &Pusher<'_>,
    ) -> Vec<RepoReport> {
        order
            .iter()
            .map(|index| {
                let handle = &tree.repos[index];
                pusher.push(&tree.abs_path(handle), &handle.display_path(), &handle.name)
            })
            .collect()
    }
}
