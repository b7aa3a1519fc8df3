//! Development automation tasks for nested-sync.
//!
//! This crate provides `cargo xtask` commands for development chores that
//! are awkward as shell scripts.
//!
//! # Usage
//!
//! ```bash
//! cargo xtask coverage                 # Coverage report with cargo-tarpaulin
//! cargo xtask coverage --format lcov   # Machine-readable report for CI
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::env;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Development automation tasks for nested-sync")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run test coverage with cargo-tarpaulin
    Coverage {
        /// Report format
        #[arg(long, short, value_enum, default_value_t = ReportFormat::Html)]
        format: ReportFormat,
        /// Minimum coverage threshold (0-100)
        #[arg(long)]
        fail_under: Option<u8>,
        /// Open HTML report in browser after completion
        #[arg(long)]
        open: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Html,
    Json,
    Xml,
    Lcov,
}

impl ReportFormat {
    /// Value of tarpaulin's `--out` flag.
    fn tarpaulin_name(self) -> &'static str {
        match self {
            Self::Html => "Html",
            Self::Json => "Json",
            Self::Xml => "Xml",
            Self::Lcov => "Lcov",
        }
    }

    fn report_path(self) -> &'static str {
        match self {
            Self::Html => "target/tarpaulin/tarpaulin-report.html",
            Self::Json => "target/tarpaulin/tarpaulin-report.json",
            Self::Xml => "target/tarpaulin/cobertura.xml",
            Self::Lcov => "target/tarpaulin/lcov.info",
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Find workspace root
    let workspace_root = workspace_root()?;
    env::set_current_dir(&workspace_root).with_context(|| {
        format!(
            "Failed to change to workspace root: {}",
            workspace_root.display()
        )
    })?;

    match cli.command {
        Commands::Coverage {
            format,
            fail_under,
            open,
        } => run_coverage(format, fail_under, open),
    }
}

/// Find the workspace root directory.
fn workspace_root() -> Result<PathBuf> {
    let output = Command::new("cargo")
        .args(["locate-project", "--workspace", "--message-format=plain"])
        .output()
        .context("Failed to run 'cargo locate-project'")?;

    if !output.status.success() {
        bail!("Failed to locate workspace root");
    }

    let path = String::from_utf8(output.stdout).context("Invalid UTF-8 in cargo output")?;
    let path = PathBuf::from(path.trim());

    path.parent()
        .map(|p| p.to_path_buf())
        .context("Failed to get parent directory of Cargo.toml")
}

/// Run test coverage with cargo-tarpaulin.
fn run_coverage(format: ReportFormat, fail_under: Option<u8>, open: bool) -> Result<()> {
    if !is_command_available("cargo-tarpaulin") {
        println!("cargo-tarpaulin is not installed.");
        println!("Install with: cargo install cargo-tarpaulin");
        println!();
        println!("Note: cargo-tarpaulin only works on Linux x86_64.");
        bail!("cargo-tarpaulin not found");
    }
    if !is_command_available("git") {
        println!("warning: git is not installed; tests on real repositories will be skipped");
    }

    let mut args = vec![
        "tarpaulin".to_string(),
        "--workspace".to_string(),
        "--exclude".to_string(),
        "xtask".to_string(),
        "--out".to_string(),
        format.tarpaulin_name().to_string(),
        "--output-dir".to_string(),
        "target/tarpaulin".to_string(),
    ];
    if let Some(threshold) = fail_under {
        args.push("--fail-under".to_string());
        args.push(threshold.to_string());
    }

    println!("Running coverage...");
    let status = run_cargo(&args)?;

    if !status.success() {
        if fail_under.is_some() {
            bail!("Coverage is below the required threshold");
        }
        bail!("Coverage failed");
    }

    let report_path = format.report_path();
    println!();
    println!("Coverage report: {}", report_path);

    if open && format == ReportFormat::Html {
        open_in_browser(report_path)?;
    }

    Ok(())
}

/// Check if a command is available in PATH.
fn is_command_available(cmd: &str) -> bool {
    Command::new(cmd)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Run a cargo command.
fn run_cargo(args: &[String]) -> Result<ExitStatus> {
    Command::new("cargo")
        .args(args)
        .status()
        .with_context(|| format!("Failed to run cargo {}", args.join(" ")))
}

/// Open a file in the default browser.
fn open_in_browser(path: &str) -> Result<()> {
    #[cfg(target_os = "linux")]
    let cmd = "xdg-open";
    #[cfg(target_os = "macos")]
    let cmd = "open";
    #[cfg(target_os = "windows")]
    let cmd = "start";

    Command::new(cmd)
        .arg(path)
        .spawn()
        .context("Failed to open browser")?;

    Ok(())
}
