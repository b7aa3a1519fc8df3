//! Thin wrappers around the system `git` binary.
//!
//! Every function targets its repository with `git -C <repo>`, so the
//! process working directory is never changed. Using the system git means
//! SSH keys, credential helpers and any transport configured in
//! `~/.gitconfig` apply unchanged.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use log::trace;

use crate::error::{Error, Result};

/// Mode git records for a gitlink (submodule) index entry.
const GITLINK_MODE: &str = "160000";

fn spawn(repo: &Path, args: &[&str]) -> Result<Output> {
    trace!("git -C {} {}", repo.display(), args.join(" "));
    Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .map_err(|e| Error::GitCommand {
            command: args.join(" "),
            repo: repo.to_path_buf(),
            stderr: e.to_string(),
        })
}

fn command_error(repo: &Path, args: &[&str], output: &Output) -> Error {
    Error::GitCommand {
        command: args.join(" "),
        repo: repo.to_path_buf(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

/// Run git and return its stdout, failing on a non-zero exit.
fn run(repo: &Path, args: &[&str]) -> Result<String> {
    let output = spawn(repo, args)?;
    if !output.status.success() {
        return Err(command_error(repo, args, &output));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a git query whose exit code 1 means "no". Any other non-zero exit is
/// an error.
fn query(repo: &Path, args: &[&str]) -> Result<bool> {
    let output = spawn(repo, args)?;
    match output.status.code() {
        Some(0) => Ok(true),
        Some(1) => Ok(false),
        _ => Err(command_error(repo, args, &output)),
    }
}

/// Absolute, canonical top level of the working tree containing `dir`.
pub fn toplevel(dir: &Path) -> Result<PathBuf> {
    let stdout = run(dir, &["rev-parse", "--show-toplevel"])?;
    let top = PathBuf::from(stdout.trim_end_matches(['\n', '\r']));
    Ok(fs::canonicalize(&top)?)
}

/// Paths of the gitlink entries recorded in the index of `repo`, sorted and
/// deduplicated. Paths are relative to `repo`.
pub fn submodule_paths(repo: &Path) -> Result<Vec<PathBuf>> {
    let stdout = run(repo, &["ls-files", "--stage", "-z"])?;
    Ok(parse_gitlinks(&stdout))
}

/// Parse `git ls-files --stage -z` output, keeping gitlink entries.
///
/// Each record is `<mode> <object> <stage>\t<path>` terminated by NUL.
pub fn parse_gitlinks(ls_files: &str) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = ls_files
        .split('\0')
        .filter_map(|record| {
            let (meta, path) = record.split_once('\t')?;
            let mode = meta.split(' ').next()?;
            (mode == GITLINK_MODE).then(|| PathBuf::from(path))
        })
        .collect();
    paths.sort();
    paths.dedup();
    paths
}

/// Names of the remotes configured on `repo`.
pub fn remotes(repo: &Path) -> Result<Vec<String>> {
    let stdout = run(repo, &["remote"])?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Whether the local branch `refs/heads/<branch>` exists.
pub fn branch_exists(repo: &Path, branch: &str) -> Result<bool> {
    let full_ref = format!("refs/heads/{}", branch);
    query(repo, &["show-ref", "--verify", "--quiet", &full_ref])
}

/// Whether tracked files match the last commit, both in the index and in the
/// working tree. Untracked files are ignored.
pub fn is_clean(repo: &Path) -> Result<bool> {
    let unstaged = query(repo, &["diff", "--quiet"])?;
    if !unstaged {
        return Ok(false);
    }
    query(repo, &["diff", "--cached", "--quiet"])
}

/// Short name of the checked-out branch, or `None` when HEAD is detached.
pub fn current_branch(repo: &Path) -> Result<Option<String>> {
    let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
    let output = spawn(repo, &args)?;
    match output.status.code() {
        Some(0) => Ok(Some(
            String::from_utf8_lossy(&output.stdout).trim().to_string(),
        )),
        Some(1) => Ok(None),
        _ => Err(command_error(repo, &args, &output)),
    }
}

pub fn checkout(repo: &Path, branch: &str) -> Result<()> {
    run(repo, &["checkout", "--quiet", branch]).map(|_| ())
}

pub fn fetch(repo: &Path, remote: &str) -> Result<()> {
    run(
        repo,
        &["fetch", "--quiet", "--no-recurse-submodules", "--tags", remote],
    )
    .map(|_| ())
}

/// Push one local branch to the branch of the same name on `remote`.
///
/// Submodules are never pushed recursively; the engine orders those pushes
/// itself.
pub fn push_branch(repo: &Path, remote: &str, branch: &str) -> Result<()> {
    let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
    run(
        repo,
        &["push", "--quiet", "--recurse-submodules=no", remote, &refspec],
    )
    .map(|_| ())
}

pub fn push_tags(repo: &Path, remote: &str) -> Result<()> {
    run(
        repo,
        &["push", "--quiet", "--recurse-submodules=no", "--tags", remote],
    )
    .map(|_| ())
}
