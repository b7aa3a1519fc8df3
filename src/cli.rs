//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::Parser;
use env_logger::Env;

use crate::commands;
use nested_sync::output::OutputConfig;

/// Nested Sync - Push a repository and its nested submodules to every remote, leaves first
#[derive(Parser, Debug)]
#[command(name = "nested-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    sync: commands::sync::SyncArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);
        let output = OutputConfig::from_env_and_flag(&self.color);

        if self.sync.tree {
            commands::tree::execute(&self.sync, &output)
        } else {
            commands::sync::execute(self.sync, &output)
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
