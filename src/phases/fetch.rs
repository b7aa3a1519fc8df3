//! Phase 3: Fetch
//!
//! Fetches every selected remote into the root and every nested repository,
//! in discovery order, so the following push pass sees what other clones
//! have already pushed. A failed fetch is a warning: a missing remote or an
//! unreachable host on one leaf must not block its siblings.

use log::{info, warn};

use super::push::select_remotes;
use super::RepoTree;
use crate::config::SyncConfig;
use crate::report::{FetchOutcome, FetchStatus};
use crate::repository::GitOperations;

/// Execute Phase 3 over the whole tree.
///
/// Excluded repositories are not fetched.
pub fn execute(
    tree: &RepoTree,
    git: &dyn GitOperations,
    config: &SyncConfig,
    remotes: &[String],
) -> Vec<FetchOutcome> {
    let mut outcomes = Vec::new();

    for handle in &tree.repos {
        let display = handle.display_path();
        if config.is_excluded(&handle.name) {
            info!("{}: excluded, not fetching", display);
            continue;
        }

        let repo = tree.abs_path(handle);
        let available = match git.remotes(&repo) {
            Ok(available) => available,
            Err(e) => {
                warn!("{}: cannot list remotes: {}", display, e);
                continue;
            }
        };

        for remote in select_remotes(remotes, &available, &display) {
            let (status, message) = match git.fetch(&repo, &remote) {
                Ok(()) => {
                    info!("{}: fetched {}", display, remote);
                    (FetchStatus::Fetched, None)
                }
                Err(e) => {
                    warn!("{}: failed to fetch {}: {}", display, remote, e);
                    (FetchStatus::FailedFetch, Some(e.to_string()))
                }
            };
            outcomes.push(FetchOutcome {
                repo: display.clone(),
                remote,
                status,
                message,
            });
        }
    }

    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phases::discovery::discover_from;
    use crate::repository::mock::{Call, MockGitOperations};
    use std::path::{Path, PathBuf};

    fn setup() -> (MockGitOperations, RepoTree) {
        let git = MockGitOperations::new();
        git.add_repo("/release", &["origin", "github"], &["master"]);
        git.add_repo("/release/safe", &["origin"], &["master"]);
        git.add_repo("/release/simulink", &["origin", "github"], &["master"]);
        git.add_submodule("/release", "safe")
            .add_submodule("/release", "simulink");
        let tree = discover_from(Path::new("/release"), &git).unwrap();
        (git, tree)
    }

    fn remotes() -> Vec<String> {
        vec!["origin".to_string(), "github".to_string()]
    }

    #[test]
    fn test_fetches_every_repo_and_remote_in_discovery_order() {
        let (git, tree) = setup();
        let outcomes = execute(&tree, &git, &Default::default(), &remotes());

        assert_eq!(outcomes.len(), 5);
        assert_eq!(
            git.calls(),
            vec![
                Call::Fetch(PathBuf::from("/release"), "origin".into()),
                Call::Fetch(PathBuf::from("/release"), "github".into()),
                Call::Fetch(PathBuf::from("/release/safe"), "origin".into()),
                Call::Fetch(PathBuf::from("/release/simulink"), "origin".into()),
                Call::Fetch(PathBuf::from("/release/simulink"), "github".into()),
            ]
        );
    }

    #[test]
    fn test_fetch_failure_does_not_stop_siblings() {
        let (git, tree) = setup();
        git.fail_fetch("/release/safe", "origin");
        let outcomes = execute(&tree, &git, &Default::default(), &remotes());

        let failed: Vec<_> = outcomes
            .iter()
            .filter(|o| o.status == FetchStatus::FailedFetch)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].repo, "safe");
        assert!(outcomes
            .iter()
            .any(|o| o.repo == "simulink" && o.status == FetchStatus::Fetched));
    }

    #[test]
    fn test_excluded_repo_is_not_fetched() {
        let (git, tree) = setup();
        let config = SyncConfig {
            exclusions: vec!["simulink".to_string()],
            ..Default::default()
        };
        let outcomes = execute(&tree, &git, &config, &remotes());

        assert!(outcomes.iter().all(|o| o.repo != "simulink"));
        assert!(!git
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Fetch(p, _) if p.ends_with("simulink"))));
    }
}
