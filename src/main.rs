//! # Nested Sync CLI
//!
//! This is the binary entry point for the `nested-sync` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Initializing logging and output styling.
//! - Handling top-level application errors and translating them into a
//!   non-zero exit code.
//!
//! The synchronization logic lives in the `nested_sync` library crate; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
