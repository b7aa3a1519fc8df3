//! # Output Configuration
//!
//! This module controls how the CLI decorates the outcome report: colors and
//! status markers, based on terminal capabilities and user preferences.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nested_sync::output::{OutputConfig, branch_marker};
//!
//! let config = OutputConfig::from_env_and_flag("auto");
//! println!("{} safe origin/master", branch_marker(&config, BranchStatus::Pushed));
//! ```

use std::env;

use console::style;

use crate::report::{BranchStatus, FetchStatus, TagStatus};

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and emojis should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }
        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }
        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }
        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the emoji when colors are enabled, the plain text otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

#[derive(Clone, Copy)]
enum Tone {
    Good,
    Neutral,
    Bad,
}

fn marker(config: &OutputConfig, tone: Tone, label: &str) -> String {
    if !config.use_color {
        return format!("[{}]", label);
    }
    let styled = match tone {
        Tone::Good => style(label).green(),
        Tone::Neutral => style(label).dim(),
        Tone::Bad => style(label).red().bold(),
    };
    // Force styling even when console thinks stdout is not a terminal
    styled.force_styling(true).to_string()
}

/// Marker for a branch outcome, e.g. `[failed-push]`.
pub fn branch_marker(config: &OutputConfig, status: BranchStatus) -> String {
    let tone = match status {
        BranchStatus::Pushed => Tone::Good,
        BranchStatus::FailedPush => Tone::Bad,
        _ => Tone::Neutral,
    };
    marker(config, tone, status.as_str())
}

pub fn tag_marker(config: &OutputConfig, status: TagStatus) -> String {
    let tone = match status {
        TagStatus::Pushed => Tone::Good,
        TagStatus::FailedTags => Tone::Bad,
    };
    marker(config, tone, status.as_str())
}

pub fn fetch_marker(config: &OutputConfig, status: FetchStatus) -> String {
    match status {
        FetchStatus::Fetched => marker(config, Tone::Good, "fetched"),
        FetchStatus::FailedFetch => marker(config, Tone::Bad, "failed-fetch"),
    }
}
