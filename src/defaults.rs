//! Default values for nested-sync configuration.
//!
//! This module provides centralized default values used by the configuration
//! layer and the CLI, ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Branches attempted on every repository, in log order.
pub const BRANCH_CANDIDATES: [&str; 3] = ["develop", "master", "main"];

/// Number of (fetch, push) passes over the nested repositories.
pub const PASSES: usize = 2;

/// Name of the per-project configuration file, looked up in the root
/// repository's working tree.
pub const PROJECT_CONFIG_FILE: &str = ".nested-sync.yaml";

/// Returns the default branch candidate list as owned strings.
pub fn branch_candidates() -> Vec<String> {
    BRANCH_CANDIDATES.iter().map(|b| b.to_string()).collect()
}

/// Returns the location of the user-wide configuration file.
///
/// Uses the platform-appropriate configuration directory:
/// - Linux: `~/.config/nested-sync/config.yaml` (XDG Base Directory)
/// - macOS: `~/Library/Application Support/nested-sync/config.yaml`
/// - Windows: `{FOLDERID_RoamingAppData}\nested-sync\config.yaml`
///
/// Returns `None` when the platform directory cannot be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("nested-sync").join("config.yaml"))
}
