//! Shared test utilities for integration and E2E tests.
//!
//! This module builds real nested git trees in temporary directories, each
//! repository backed by one bare repository per remote, so the binary can
//! fetch and push without touching the network.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = NestedTree::release();
//!     fixture.command().assert().success();
//! }
//! ```

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use assert_fs::prelude::*;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git, git_available, NestedTree, REMOTES};
}

/// Remotes every fixture repository is published to.
pub const REMOTES: [&str; 2] = ["origin", "github"];

/// Check whether a usable `git` binary is on the PATH.
///
/// # Example
///
/// ```rust,ignore
/// if !git_available() {
///     println!("Skipping: git not installed");
///     return;
/// }
/// ```
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir` with a fixed identity, panicking on failure.
///
/// Returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args([
            "-c",
            "protocol.file.allow=always",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test User")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test User")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A nested repository tree with bare remotes.
///
/// Layout inside the temporary directory:
///
/// ```text
/// remotes/<remote>/<name>.git   bare repository per remote and repository
/// seed/<name>                   scratch clones used to build the tree
/// release/                      root working tree under test
/// ```
pub struct NestedTree {
    temp_dir: assert_fs::TempDir,
}

impl NestedTree {
    /// Create an empty fixture.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// The standard tree: `release -> {safe -> shared, user}`.
    ///
    /// Every working tree is on `master`, clean, and in sync with both
    /// remotes.
    pub fn release() -> Self {
        let fixture = Self::new();
        fixture.publish("shared", &[]);
        fixture.publish("safe", &["shared"]);
        fixture.publish("user", &[]);
        fixture.publish("release", &["safe", "user"]);
        fixture.clone_root(
            "release",
            &[("safe", "safe"), ("safe/shared", "shared"), ("user", "user")],
        );
        fixture
    }

    /// The standard tree with a second clone of `shared`:
    /// `release -> {safe -> shared, user -> shared}`.
    ///
    /// Both clones of `shared` publish to the same bare remotes, so once one
    /// of them pushes a new commit the other is behind.
    pub fn release_full() -> Self {
        let fixture = Self::new();
        fixture.publish("shared", &[]);
        fixture.publish("safe", &["shared"]);
        fixture.publish("user", &["shared"]);
        fixture.publish("release", &["safe", "user"]);
        fixture.clone_root(
            "release",
            &[
                ("safe", "safe"),
                ("safe/shared", "shared"),
                ("user", "user"),
                ("user/shared", "shared"),
            ],
        );
        fixture
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root working tree under test.
    pub fn root(&self) -> PathBuf {
        self.path().join("release")
    }

    /// Working tree of a repository, relative to the root.
    pub fn repo(&self, relative: &str) -> PathBuf {
        if relative == "." {
            self.root()
        } else {
            self.root().join(relative)
        }
    }

    /// Bare repository backing `name` on `remote`.
    pub fn bare(&self, remote: &str, name: &str) -> PathBuf {
        self.path()
            .join("remotes")
            .join(remote)
            .join(format!("{}.git", name))
    }

    /// Commit at `refs/heads/<branch>` in a bare remote, if any.
    pub fn remote_head(&self, remote: &str, name: &str, branch: &str) -> Option<String> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(self.bare(remote, name))
            .args(["rev-parse", "--verify", "--quiet"])
            .arg(format!("refs/heads/{}", branch))
            .output()
            .expect("Failed to run git");
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Commit at `branch` in a working tree.
    pub fn local_head(&self, relative: &str, branch: &str) -> String {
        git(&self.repo(relative), &["rev-parse", branch])
    }

    /// Branch checked out in a working tree.
    pub fn current_branch(&self, relative: &str) -> String {
        git(&self.repo(relative), &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Add a file and commit it on the current branch.
    pub fn commit_file(&self, relative: &str, file: &str, content: &str) -> String {
        let dir = self.repo(relative);
        std::fs::write(dir.join(file), content).expect("Failed to write file");
        git(&dir, &["add", file]);
        git(&dir, &["commit", "-q", "-m", &format!("Update {}", file)]);
        git(&dir, &["rev-parse", "HEAD"])
    }

    /// Record the current commit of a submodule in its parent.
    pub fn commit_pointer(&self, parent: &str, submodule: &str) -> String {
        let dir = self.repo(parent);
        git(&dir, &["add", submodule]);
        git(&dir, &["commit", "-q", "-m", &format!("Bump {}", submodule)]);
        git(&dir, &["rev-parse", "HEAD"])
    }

    /// Push a commit to `remote` from an unrelated clone, so the tree's
    /// copy of `name` falls behind.
    pub fn advance_remote(&self, remote: &str, name: &str) {
        let scratch = self.path().join("scratch").join(name);
        if !scratch.exists() {
            git(
                self.path(),
                &[
                    "clone",
                    "-q",
                    &self.bare(remote, name).to_string_lossy(),
                    &scratch.to_string_lossy(),
                ],
            );
        }
        std::fs::write(scratch.join("elsewhere.txt"), "pushed from another clone\n")
            .expect("Failed to write file");
        git(&scratch, &["add", "elsewhere.txt"]);
        git(&scratch, &["commit", "-q", "-m", "Work from another clone"]);
        git(&scratch, &["push", "-q", "origin", "master"]);
    }

    /// Write `.nested-sync.yaml` in the root.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("release/.nested-sync.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Create a command running `nested-sync` on the root.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("nested-sync");
        cmd.current_dir(self.path())
            .arg(self.root())
            .arg("--color")
            .arg("never")
            .env_remove("NESTED_SYNC_CONFIG")
            .env_remove("RUST_LOG")
            // Keep any user configuration out of the run
            .env("XDG_CONFIG_HOME", self.path().join("xdg"))
            .env("HOME", self.path().join("home"));
        cmd
    }

    /// Create bare remotes for `name` and seed them with one commit that
    /// embeds `submodules` (already published).
    fn publish(&self, name: &str, submodules: &[&str]) {
        for remote in REMOTES {
            let bare = self.bare(remote, name);
            std::fs::create_dir_all(&bare).expect("Failed to create bare dir");
            git(&bare, &["init", "-q", "--bare", "-b", "master"]);
        }

        let seed = self.path().join("seed").join(name);
        std::fs::create_dir_all(&seed).expect("Failed to create seed dir");
        git(&seed, &["init", "-q", "-b", "master"]);
        std::fs::write(seed.join("README.md"), format!("# {}\n", name))
            .expect("Failed to write README");
        git(&seed, &["add", "README.md"]);
        for submodule in submodules {
            git(
                &seed,
                &[
                    "submodule",
                    "add",
                    "-q",
                    &self.bare("origin", submodule).to_string_lossy(),
                    submodule,
                ],
            );
        }
        git(&seed, &["commit", "-q", "-m", "Initial commit"]);
        git(&seed, &["tag", "v1"]);
        for remote in REMOTES {
            let url = self.bare(remote, name);
            git(&seed, &["push", "-q", &url.to_string_lossy(), "master", "v1"]);
        }
    }

    /// Clone the published root with all submodules, put every working
    /// tree on `master`, and add every remote to every repository.
    ///
    /// `nested` pairs each submodule's path with the published repository
    /// behind it.
    fn clone_root(&self, name: &str, nested: &[(&str, &str)]) {
        git(
            self.path(),
            &[
                "clone",
                "-q",
                "--recurse-submodules",
                &self.bare("origin", name).to_string_lossy(),
                &self.root().to_string_lossy(),
            ],
        );

        for &(relative, repo) in std::iter::once(&(".", name)).chain(nested) {
            let dir = self.repo(relative);
            git(&dir, &["checkout", "-q", "master"]);
            for remote in REMOTES.iter().filter(|r| **r != "origin") {
                git(
                    &dir,
                    &[
                        "remote",
                        "add",
                        remote,
                        &self.bare(remote, repo).to_string_lossy(),
                    ],
                );
            }
        }
    }
}

impl Default for NestedTree {
    fn default() -> Self {
        Self::new()
    }
}
