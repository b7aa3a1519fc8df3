//! # Sync Command Implementation
//!
//! The default (and only) operation of `nested-sync`: discover the tree at
//! `DIR`, run the fetch/push passes leaves first, push the root, and print
//! the outcome report.
//!
//! Failed pushes, tag pushes and fetches are reported but do not change the
//! exit code; only fatal errors (not a repository, unreadable directory,
//! invalid configuration) exit non-zero.

use std::fmt::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use log::warn;

use nested_sync::config::{self, ConfigLayer};
use nested_sync::defaults;
use nested_sync::output::{branch_marker, emoji, fetch_marker, tag_marker, OutputConfig};
use nested_sync::phases::discovery;
use nested_sync::phases::orchestrator::{Orchestrator, SyncPlan};
use nested_sync::report::{BranchStatus, FetchStatus, RepoReport, SyncReport};
use nested_sync::repository::DefaultGitOperations;

/// Report format
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

/// Arguments for a synchronization run
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Root repository of the tree to synchronize
    #[arg(value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Configuration file, replacing `<DIR>/.nested-sync.yaml`
    #[arg(short, long, value_name = "PATH", env = "NESTED_SYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Remote to push to (repeatable; default: every remote of the root)
    #[arg(short, long, value_name = "NAME")]
    pub remote: Vec<String>,

    /// Branch to push (repeatable; default: develop, master, main)
    #[arg(short, long, value_name = "NAME")]
    pub branch: Vec<String>,

    /// Skip repositories whose name contains this text (repeatable)
    #[arg(short = 'x', long, value_name = "TEXT")]
    pub exclude: Vec<String>,

    /// Check out each branch before pushing it, restoring the prior branch
    #[arg(long)]
    pub strict: bool,

    /// Number of fetch/push passes over the nested repositories
    #[arg(long, value_name = "N")]
    pub passes: Option<usize>,

    /// Keep running passes up to N until two consecutive passes agree
    #[arg(long, value_name = "N")]
    pub max_passes: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Show the push order and planned pushes without fetching or pushing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the discovered repository tree and exit
    #[arg(long, conflicts_with = "dry_run")]
    pub tree: bool,

    /// Suppress the report
    #[arg(short, long)]
    pub quiet: bool,
}

impl SyncArgs {
    /// The configuration layer given on the command line.
    ///
    /// `--passes N` alone means exactly N passes.
    pub fn config_layer(&self) -> ConfigLayer {
        let non_empty = |values: &Vec<String>| (!values.is_empty()).then(|| values.clone());
        ConfigLayer {
            remotes: non_empty(&self.remote),
            branch_candidates: non_empty(&self.branch),
            exclusions: non_empty(&self.exclude),
            strict: self.strict.then_some(true),
            min_passes: self.passes,
            max_passes: self.max_passes.or(self.passes),
        }
    }
}

/// Execute a synchronization run (or a dry run).
pub fn execute(args: SyncArgs, output: &OutputConfig) -> Result<()> {
    let root = discovery::resolve_root(&args.dir)?;
    let config = config::load(
        &root,
        args.config.as_deref(),
        defaults::user_config_path(),
        args.config_layer(),
    )?;

    let git = DefaultGitOperations;
    let orchestrator = Orchestrator::new(&git, config);

    if args.dry_run {
        let plan = orchestrator.plan(&root)?;
        if !args.quiet {
            match args.format {
                Format::Text => {
                    let mut text = String::new();
                    render_plan(&mut text, &plan, output)?;
                    print!("{}", text);
                }
                Format::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
            }
        }
        return Ok(());
    }

    let report = orchestrator.synchronize(&root)?;
    let config = orchestrator.config();
    if !report.converged && config.max_passes > config.min_passes {
        warn!(
            "Outcomes still changing after {} passes; re-run to finish",
            report.passes.len()
        );
    }

    if !args.quiet {
        match args.format {
            Format::Text => {
                let mut text = String::new();
                render_report(&mut text, &report, output)?;
                print!("{}", text);
            }
            Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }
    }

    Ok(())
}

/// Write a run report as text.
pub fn render_report(
    out: &mut impl Write,
    report: &SyncReport,
    output: &OutputConfig,
) -> fmt::Result {
    writeln!(out, "{} Synchronized {}", emoji(output, "🔄", "==>"), report.root)?;
    writeln!(out, "   remotes: {}", remote_list(&report.remotes))?;

    for pass in &report.passes {
        writeln!(out)?;
        writeln!(out, "Pass {}", pass.number)?;
        for fetch in &pass.fetches {
            if fetch.status == FetchStatus::FailedFetch {
                writeln!(
                    out,
                    "  {} {} {}{}",
                    fetch_marker(output, fetch.status),
                    fetch.repo,
                    fetch.remote,
                    detail(&fetch.message)
                )?;
            }
        }
        for repo in &pass.repos {
            render_repo(out, repo, output)?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Root")?;
    render_repo(out, &report.root_push, output)?;

    let summary = report.summary();
    writeln!(out)?;
    writeln!(
        out,
        "{} {} pushed, {} skipped, {} failed ({} passes{})",
        emoji(output, "📊", "Summary:"),
        summary.pushed,
        summary.skipped,
        summary.failures(),
        report.passes.len(),
        if report.converged { ", converged" } else { "" }
    )?;

    let attention = report.attention();
    if !attention.is_empty() {
        writeln!(out, "{} Needs attention:", emoji(output, "⚠️ ", "[WARN]"))?;
        for (repo, remote, branch) in attention {
            writeln!(out, "  {} {} {}", repo, remote, branch)?;
        }
    }

    Ok(())
}

fn render_repo(out: &mut impl Write, repo: &RepoReport, output: &OutputConfig) -> fmt::Result {
    if repo.excluded {
        writeln!(
            out,
            "  {} {}",
            repo.path,
            branch_marker(output, BranchStatus::SkippedExcluded)
        )?;
        return Ok(());
    }

    writeln!(out, "  {}", repo.path)?;
    for o in &repo.branches {
        writeln!(
            out,
            "    {} {} {}{}",
            o.remote,
            o.branch,
            branch_marker(output, o.status),
            detail(&o.message)
        )?;
    }
    for o in &repo.tags {
        writeln!(
            out,
            "    {} --tags {}{}",
            o.remote,
            tag_marker(output, o.status),
            detail(&o.message)
        )?;
    }
    for error in &repo.errors {
        writeln!(out, "    error: {}", error)?;
    }
    Ok(())
}

/// Write a dry-run plan as text.
pub fn render_plan(out: &mut impl Write, plan: &SyncPlan, output: &OutputConfig) -> fmt::Result {
    writeln!(out, "{} Dry run for {}", emoji(output, "🔎", "==>"), plan.root)?;
    writeln!(out, "   remotes: {}", remote_list(&plan.remotes))?;
    writeln!(out)?;

    for (i, step) in plan.steps.iter().enumerate() {
        if step.excluded {
            writeln!(
                out,
                "{:>3}. {} {}",
                i + 1,
                step.path,
                branch_marker(output, BranchStatus::SkippedExcluded)
            )?;
            continue;
        }
        writeln!(out, "{:>3}. {}", i + 1, step.path)?;
        if step.pushes.is_empty() {
            writeln!(out, "       (no branches to push)")?;
        }
        for (remote, branch) in &step.pushes {
            writeln!(out, "       {} {}", remote, branch)?;
        }
    }

    Ok(())
}

fn remote_list(remotes: &[String]) -> String {
    if remotes.is_empty() {
        "(none)".to_string()
    } else {
        remotes.join(", ")
    }
}

fn detail(message: &Option<String>) -> String {
    message
        .as_ref()
        .and_then(|m| m.lines().next())
        .map(|line| format!(": {}", line))
        .unwrap_or_default()
}
