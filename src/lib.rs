//! # Nested Repository Synchronization Library
//!
//! This library pushes a git repository that embeds other repositories
//! (submodules, possibly nested several levels deep) to its remotes in an
//! order that keeps every published submodule pointer resolvable. It is used
//! by the `nested-sync` command-line tool but can also be driven directly.
//!
//! ## Quick Example
//!
//! ```no_run
//! use std::path::Path;
//! use nested_sync::config::SyncConfig;
//! use nested_sync::phases::orchestrator::Orchestrator;
//! use nested_sync::repository::DefaultGitOperations;
//!
//! let git = DefaultGitOperations;
//! let orchestrator = Orchestrator::new(&git, SyncConfig::default());
//! let report = orchestrator.synchronize(Path::new("/work/release")).unwrap();
//! for (repo, remote, branch) in report.attention() {
//!     println!("{} {} {}", repo, remote, branch);
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - **Configuration (`config`, `defaults`)**: remotes, branch candidates,
//!   exclusions, strict mode and pass bounds, layered from built-in
//!   defaults, YAML files and CLI flags.
//! - **Git access (`git`, `repository`)**: free functions that shell out to
//!   the system `git`, wrapped by the mockable `GitOperations` trait.
//! - **State inspection (`inspector`)**: read-only queries for branch
//!   existence, working tree cleanliness and the checked-out branch.
//! - **Phases (`phases`)**: discovery, ordering, fetch and push, coordinated
//!   by the orchestrator.
//! - **Reports (`report`)**: the per-pass, per-repository outcome record
//!   returned by every run.
//!
//! ## Execution Flow
//!
//! 1.  **Discovery**: walk the submodule graph from the root.
//! 2.  **Ordering**: schedule nested repositories leaves first.
//! 3.  **Fetch**: fetch every selected remote into every repository.
//! 4.  **Push**: push every branch candidate and all tags, per remote.
//! 5.  Repeat 3-4 until the pass bounds are met, then push the root.

pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod inspector;
pub mod output;
pub mod phases;
pub mod report;
pub mod repository;

#[cfg(test)]
mod ordering_proptest;
