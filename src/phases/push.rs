//! Phase 4: Remote Fan-Out Push
//!
//! Pushes one repository's candidate branches and all of its tags to every
//! selected remote that the repository actually has. This is the only phase
//! that changes repository state or talks to remotes with write intent.
//!
//! ## Process
//!
//! For each remote in turn:
//!
//! 1.  **Branches**: Each candidate branch that exists locally is pushed to
//!     the branch of the same name. A rejected push is recorded as
//!     `failed-push` and the next branch is attempted; a submodule clone that
//!     is behind another clone of the same submodule is expected to be
//!     rejected.
//!
//! 2.  **Tags**: All tags are pushed, whatever happened to the branches.
//!
//! ## Strict Mode
//!
//! In strict mode a branch that is not checked out is checked out before it
//! is pushed. The switch only happens on a clean working tree and while a
//! branch is checked out (so there is something to return to). The prior
//! branch is captured in a [`CheckoutGuard`] and restored on every exit
//! path, so the repository's checkout is observably unchanged afterwards.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::SyncConfig;
use crate::error::Result;
use crate::inspector::StateInspector;
use crate::report::{BranchStatus, RepoReport, TagStatus};
use crate::repository::GitOperations;

/// A branch checked out in place of a prior one.
///
/// Created by [`CheckoutGuard::acquire`], which performs the checkout.
/// [`CheckoutGuard::release`] switches back and reports the result; if the
/// guard is dropped without being released, the drop switches back and logs
/// any failure.
pub struct CheckoutGuard<'a> {
    git: &'a dyn GitOperations,
    repo: PathBuf,
    prior: String,
    released: bool,
}

impl<'a> CheckoutGuard<'a> {
    /// Check out `target`, remembering `prior` for the release.
    pub fn acquire(
        git: &'a dyn GitOperations,
        repo: &Path,
        prior: &str,
        target: &str,
    ) -> Result<Self> {
        debug!("{}: checking out {} (was {})", repo.display(), target, prior);
        git.checkout(repo, target)?;
        Ok(Self {
            git,
            repo: repo.to_path_buf(),
            prior: prior.to_string(),
            released: false,
        })
    }

    pub fn prior(&self) -> &str {
        &self.prior
    }

    /// Restore the prior branch.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        self.git.checkout(&self.repo, &self.prior)
    }
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.git.checkout(&self.repo, &self.prior) {
            warn!(
                "{}: could not restore branch {}: {}",
                self.repo.display(),
                self.prior,
                e
            );
        }
    }
}

/// Inputs shared by every repository pushed in a run
pub struct Pusher<'a> {
    git: &'a dyn GitOperations,
    config: &'a SyncConfig,
    /// Remotes selected for the run, in push order
    remotes: &'a [String],
}

impl<'a> Pusher<'a> {
    pub fn new(git: &'a dyn GitOperations, config: &'a SyncConfig, remotes: &'a [String]) -> Self {
        Self {
            git,
            config,
            remotes,
        }
    }

    /// Execute Phase 4 for one repository.
    ///
    /// `repo` is the absolute location, `display` the path used in logs and
    /// the report, `name` the basename checked against exclusions. Never
    /// fails: every problem ends up in the returned report.
    pub fn push(&self, repo: &Path, display: &str, name: &str) -> RepoReport {
        let mut report = RepoReport::new(display);

        if self.config.is_excluded(name) {
            info!("{}: excluded, skipping", display);
            report.excluded = true;
            for remote in self.remotes {
                for branch in &self.config.branch_candidates {
                    report.record_branch(remote, branch, BranchStatus::SkippedExcluded, None);
                }
            }
            return report;
        }

        let remotes = match self.git.remotes(repo) {
            Ok(available) => select_remotes(self.remotes, &available, display),
            Err(e) => {
                warn!("{}: cannot list remotes: {}", display, e);
                report.errors.push(e.to_string());
                return report;
            }
        };

        let inspector = StateInspector::new(self.git);
        report.branch_before = inspector.current_branch(repo).unwrap_or_else(|e| {
            warn!("{}: cannot read current branch: {}", display, e);
            report.errors.push(e.to_string());
            None
        });
        report.clean = match inspector.is_clean(repo) {
            Ok(clean) => Some(clean),
            Err(e) => {
                warn!("{}: cannot check working tree: {}", display, e);
                report.errors.push(e.to_string());
                None
            }
        };

        for remote in &remotes {
            for branch in &self.config.branch_candidates {
                let (status, message) =
                    self.push_branch(&inspector, repo, display, remote, branch, &mut report);
                report.record_branch(remote, branch, status, message);
            }

            match self.git.push_tags(repo, remote) {
                Ok(()) => {
                    info!("{}: pushed tags to {}", display, remote);
                    report.record_tags(remote, TagStatus::Pushed, None);
                }
                Err(e) => {
                    warn!("{}: failed to push tags to {}: {}", display, remote, e);
                    report.record_tags(remote, TagStatus::FailedTags, Some(e.to_string()));
                }
            }
        }

        report.branch_after = inspector.current_branch(repo).unwrap_or_else(|e| {
            warn!("{}: cannot read branch after push: {}", display, e);
            report.errors.push(e.to_string());
            None
        });
        report
    }

    fn push_branch(
        &self,
        inspector: &StateInspector<'_>,
        repo: &Path,
        display: &str,
        remote: &str,
        branch: &str,
        report: &mut RepoReport,
    ) -> (BranchStatus, Option<String>) {
        match inspector.ref_exists(repo, branch) {
            Ok(true) => {}
            Ok(false) => {
                info!("{}: no branch {}, skipping {}", display, branch, remote);
                return (BranchStatus::SkippedNoBranch, None);
            }
            Err(e) => {
                warn!("{}: cannot check branch {}: {}", display, branch, e);
                return (BranchStatus::FailedPush, Some(e.to_string()));
            }
        }

        let needs_checkout =
            self.config.strict && report.branch_before.as_deref() != Some(branch);
        if !needs_checkout {
            return self.push_checked_out(repo, display, remote, branch);
        }

        let Some(prior) = report.branch_before.clone() else {
            info!(
                "{}: HEAD is detached, not switching to {} for {}",
                display, branch, remote
            );
            return (BranchStatus::SkippedDetached, None);
        };

        match inspector.is_clean(repo) {
            Ok(true) => {}
            Ok(false) => {
                info!(
                    "{}: uncommitted changes, not switching to {} for {}",
                    display, branch, remote
                );
                return (BranchStatus::SkippedDirty, None);
            }
            Err(e) => {
                warn!(
                    "{}: cannot check working tree, not switching to {}: {}",
                    display, branch, e
                );
                return (BranchStatus::FailedPush, Some(e.to_string()));
            }
        }

        let guard = match CheckoutGuard::acquire(self.git, repo, &prior, branch) {
            Ok(guard) => guard,
            Err(e) => {
                warn!("{}: cannot check out {}: {}", display, branch, e);
                return (BranchStatus::FailedPush, Some(e.to_string()));
            }
        };
        let outcome = self.push_checked_out(repo, display, remote, branch);
        let prior = guard.prior().to_string();
        if let Err(e) = guard.release() {
            warn!("{}: could not restore branch {}: {}", display, prior, e);
            report.errors.push(e.to_string());
        }
        outcome
    }

    fn push_checked_out(
        &self,
        repo: &Path,
        display: &str,
        remote: &str,
        branch: &str,
    ) -> (BranchStatus, Option<String>) {
        match self.git.push_branch(repo, remote, branch) {
            Ok(()) => {
                info!("{}: pushed {} to {}", display, branch, remote);
                (BranchStatus::Pushed, None)
            }
            Err(e) => {
                warn!("{}: failed to push {} to {}: {}", display, branch, remote, e);
                (BranchStatus::FailedPush, Some(e.to_string()))
            }
        }
    }
}

/// Selected remotes that `available` actually has, in selection order.
///
/// A selected remote missing from a repository is skipped silently.
pub fn select_remotes(selected: &[String], available: &[String], display: &str) -> Vec<String> {
    selected
        .iter()
        .filter(|remote| {
            let present = available.contains(remote);
            if !present {
                debug!("{}: no remote {}, skipping", display, remote);
            }
            present
        })
        .cloned()
        .collect()
}
