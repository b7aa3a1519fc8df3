//! # Outcome Report
//!
//! Everything a run did, structured for display. The engine fills a
//! `SyncReport` as it goes and hands it back to the caller; it never prints
//! anything itself.
//!
//! ## Shape
//!
//! - One `PassReport` per (fetch, push) pass over the nested repositories,
//!   holding the fetch outcomes and one `RepoReport` per repository in push
//!   order.
//! - A final `RepoReport` for the root push.
//!
//! Each `RepoReport` records a `BranchOutcome` per (remote, branch) pair and
//! a `TagOutcome` per remote, plus the checkout state seen around the push.

use serde::Serialize;

/// Result of one (remote, branch) push attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BranchStatus {
    Pushed,
    SkippedNoBranch,
    SkippedExcluded,
    SkippedDirty,
    SkippedDetached,
    FailedPush,
}

impl BranchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchStatus::Pushed => "pushed",
            BranchStatus::SkippedNoBranch => "skipped-no-branch",
            BranchStatus::SkippedExcluded => "skipped-excluded",
            BranchStatus::SkippedDirty => "skipped-dirty",
            BranchStatus::SkippedDetached => "skipped-detached",
            BranchStatus::FailedPush => "failed-push",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            BranchStatus::SkippedNoBranch
                | BranchStatus::SkippedExcluded
                | BranchStatus::SkippedDirty
                | BranchStatus::SkippedDetached
        )
    }
}

/// Result of pushing all tags to one remote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagStatus {
    Pushed,
    FailedTags,
}

impl TagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagStatus::Pushed => "pushed",
            TagStatus::FailedTags => "failed-tags",
        }
    }
}

/// Result of fetching one remote into one repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStatus {
    Fetched,
    FailedFetch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchOutcome {
    pub remote: String,
    pub branch: String,
    pub status: BranchStatus,
    /// Git's error output for failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOutcome {
    pub remote: String,
    pub status: TagStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchOutcome {
    pub repo: String,
    pub remote: String,
    pub status: FetchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Everything the pusher did to one repository
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepoReport {
    /// Root-relative path, `.` for the root
    pub path: String,
    pub excluded: bool,
    /// Whether tracked files were unmodified when the push began
    pub clean: Option<bool>,
    pub branch_before: Option<String>,
    pub branch_after: Option<String>,
    pub branches: Vec<BranchOutcome>,
    pub tags: Vec<TagOutcome>,
    /// A repository-level problem that prevented some attempts, such as
    /// failing to list remotes or to restore the prior checkout
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl RepoReport {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn record_branch(
        &mut self,
        remote: &str,
        branch: &str,
        status: BranchStatus,
        message: Option<String>,
    ) {
        self.branches.push(BranchOutcome {
            remote: remote.to_string(),
            branch: branch.to_string(),
            status,
            message,
        });
    }

    pub fn record_tags(&mut self, remote: &str, status: TagStatus, message: Option<String>) {
        self.tags.push(TagOutcome {
            remote: remote.to_string(),
            status,
            message,
        });
    }

    /// Outcome for one (remote, branch) pair, if it was attempted.
    pub fn branch_status(&self, remote: &str, branch: &str) -> Option<BranchStatus> {
        self.branches
            .iter()
            .find(|o| o.remote == remote && o.branch == branch)
            .map(|o| o.status)
    }

    pub fn tag_status(&self, remote: &str) -> Option<TagStatus> {
        self.tags
            .iter()
            .find(|o| o.remote == remote)
            .map(|o| o.status)
    }

    pub fn has_failures(&self) -> bool {
        !self.errors.is_empty()
            || self.branches.iter().any(|o| o.status == BranchStatus::FailedPush)
            || self.tags.iter().any(|o| o.status == TagStatus::FailedTags)
    }
}

/// One (fetch, ordered push) pass over the nested repositories
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// 1-based pass number
    pub number: usize,
    pub fetches: Vec<FetchOutcome>,
    /// In push order
    pub repos: Vec<RepoReport>,
}

impl PassReport {
    /// The statuses of this pass, without messages, for comparing passes.
    pub fn signature(&self) -> Vec<(&str, &str, &str, &'static str)> {
        let mut signature = Vec::new();
        for repo in &self.repos {
            for o in &repo.branches {
                signature.push((
                    repo.path.as_str(),
                    o.remote.as_str(),
                    o.branch.as_str(),
                    o.status.as_str(),
                ));
            }
            for o in &repo.tags {
                signature.push((repo.path.as_str(), o.remote.as_str(), "", o.status.as_str()));
            }
        }
        signature
    }

    pub fn repo(&self, path: &str) -> Option<&RepoReport> {
        self.repos.iter().find(|r| r.path == path)
    }
}

/// Counts over a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub pushed: usize,
    pub skipped: usize,
    pub failed_push: usize,
    pub tags_pushed: usize,
    pub failed_tags: usize,
    pub failed_fetch: usize,
}

impl Summary {
    pub fn failures(&self) -> usize {
        self.failed_push + self.failed_tags + self.failed_fetch
    }
}

/// The outcome of a complete run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Absolute root directory
    pub root: String,
    /// Remotes selected for this run
    pub remotes: Vec<String>,
    pub passes: Vec<PassReport>,
    pub root_push: RepoReport,
    /// Whether the last two passes produced the same outcomes
    pub converged: bool,
}

impl SyncReport {
    /// Every repository report, passes first, root last.
    pub fn repo_reports(&self) -> impl Iterator<Item = &RepoReport> {
        self.passes
            .iter()
            .flat_map(|p| p.repos.iter())
            .chain(std::iter::once(&self.root_push))
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for repo in self.repo_reports() {
            for o in &repo.branches {
                match o.status {
                    BranchStatus::Pushed => summary.pushed += 1,
                    BranchStatus::FailedPush => summary.failed_push += 1,
                    _ => summary.skipped += 1,
                }
            }
            for o in &repo.tags {
                match o.status {
                    TagStatus::Pushed => summary.tags_pushed += 1,
                    TagStatus::FailedTags => summary.failed_tags += 1,
                }
            }
        }
        summary.failed_fetch = self
            .passes
            .iter()
            .flat_map(|p| p.fetches.iter())
            .filter(|f| f.status == FetchStatus::FailedFetch)
            .count();
        summary
    }

    /// `(repository, remote, branch)` tuples that need manual attention.
    ///
    /// Tag failures use `--tags` as the branch; a tuple that failed in an
    /// early pass but was pushed later is not listed.
    pub fn attention(&self) -> Vec<(String, String, String)> {
        let last_pass = self.passes.last().into_iter().flat_map(|p| p.repos.iter());
        let mut tuples = Vec::new();
        for repo in last_pass.chain(std::iter::once(&self.root_push)) {
            for o in &repo.branches {
                if o.status == BranchStatus::FailedPush {
                    tuples.push((repo.path.clone(), o.remote.clone(), o.branch.clone()));
                }
            }
            for o in &repo.tags {
                if o.status == TagStatus::FailedTags {
                    tuples.push((repo.path.clone(), o.remote.clone(), "--tags".to_string()));
                }
            }
        }
        tuples
    }
}
