//! # Synchronization Configuration
//!
//! This module defines `SyncConfig`, the explicit set of knobs the
//! orchestrator is constructed with, and the layered loading that produces
//! it.
//!
//! ## Key Components
//!
//! - **`SyncConfig`**: The resolved configuration. Every field has a default,
//!   so an empty configuration is valid.
//!
//! - **`ConfigLayer`**: A partial configuration where every field is
//!   optional. Layers are parsed from YAML files or built from CLI flags and
//!   applied on top of each other.
//!
//! ## Layering
//!
//! Layers are applied in this order, later layers winning field by field:
//!
//! 1.  Built-in defaults (see [`crate::defaults`]).
//! 2.  The user configuration file, if present.
//! 3.  The project configuration file (`.nested-sync.yaml` in the target
//!     directory) or an explicitly named file.
//! 4.  Command-line flags.
//!
//! ## File Format
//!
//! ```yaml
//! remotes: [origin, github]
//! branch_candidates: [develop, master, main]
//! exclusions: [simulink]
//! strict: false
//! min_passes: 2
//! max_passes: 2
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};

/// Resolved synchronization configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncConfig {
    /// Remotes to push to. `None` means "every remote configured on the
    /// root repository"; `Some` is a fixed list (legacy mode).
    pub remotes: Option<Vec<String>>,
    /// Branches attempted on every repository.
    pub branch_candidates: Vec<String>,
    /// Repository-name substrings; matching repositories are skipped.
    pub exclusions: Vec<String>,
    /// Check out each branch before pushing it, restoring the prior branch
    /// afterwards.
    pub strict: bool,
    /// Passes always run before convergence is checked.
    pub min_passes: usize,
    /// Upper bound on passes.
    pub max_passes: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remotes: None,
            branch_candidates: defaults::branch_candidates(),
            exclusions: Vec::new(),
            strict: false,
            min_passes: defaults::PASSES,
            max_passes: defaults::PASSES,
        }
    }
}

/// Partial configuration, as read from one source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    #[serde(default)]
    pub remotes: Option<Vec<String>>,
    #[serde(default)]
    pub branch_candidates: Option<Vec<String>>,
    #[serde(default)]
    pub exclusions: Option<Vec<String>>,
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub min_passes: Option<usize>,
    #[serde(default)]
    pub max_passes: Option<usize>,
}

impl SyncConfig {
    /// Apply a layer on top of this configuration.
    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(remotes) = layer.remotes {
            self.remotes = Some(remotes);
        }
        if let Some(branches) = layer.branch_candidates {
            self.branch_candidates = branches;
        }
        if let Some(exclusions) = layer.exclusions {
            self.exclusions = exclusions;
        }
        if let Some(strict) = layer.strict {
            self.strict = strict;
        }
        if let Some(min) = layer.min_passes {
            self.min_passes = min;
            // A lone min_passes raises the bound with it
            if layer.max_passes.is_none() && self.max_passes < min {
                self.max_passes = min;
            }
        }
        if let Some(max) = layer.max_passes {
            self.max_passes = max;
        }
    }

    /// Check the invariants the orchestrator relies on.
    pub fn validate(&self) -> Result<()> {
        if self.branch_candidates.is_empty() {
            return Err(Error::ConfigParse {
                message: "branch_candidates is empty".to_string(),
                hint: Some("List at least one branch, e.g. [develop, master, main]".to_string()),
            });
        }
        if self.min_passes == 0 {
            return Err(Error::ConfigParse {
                message: "min_passes must be at least 1".to_string(),
                hint: None,
            });
        }
        if self.max_passes < self.min_passes {
            return Err(Error::ConfigParse {
                message: format!(
                    "max_passes ({}) is smaller than min_passes ({})",
                    self.max_passes, self.min_passes
                ),
                hint: Some("Raise max_passes or lower min_passes".to_string()),
            });
        }

        let lists = [
            ("remotes", self.remotes.as_deref().unwrap_or_default()),
            ("branch_candidates", self.branch_candidates.as_slice()),
            ("exclusions", self.exclusions.as_slice()),
        ];
        for (field, values) in lists {
            if values.iter().any(|v| v.trim().is_empty()) {
                return Err(Error::ConfigParse {
                    message: format!("{} contains an empty entry", field),
                    hint: None,
                });
            }
        }

        Ok(())
    }

    /// Whether a repository with the given basename is excluded.
    ///
    /// Matching is a case-sensitive substring test.
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclusions
            .iter()
            .any(|pattern| name.contains(pattern.as_str()))
    }
}

/// Parse a configuration layer from YAML.
///
/// An empty document is an empty layer.
pub fn parse(yaml_content: &str) -> Result<ConfigLayer> {
    if yaml_content.trim().is_empty() {
        return Ok(ConfigLayer::default());
    }
    serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some(
            "Known keys: remotes, branch_candidates, exclusions, strict, min_passes, max_passes"
                .to_string(),
        ),
    })
}

/// Read and parse a configuration layer from a file.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ConfigLayer> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::ConfigParse {
        message: format!("cannot read {}: {}", path.display(), e),
        hint: None,
    })?;
    parse(&content).map_err(|e| match e {
        Error::ConfigParse { message, hint } => Error::ConfigParse {
            message: format!("{}: {}", path.display(), message),
            hint,
        },
        other => other,
    })
}

/// Resolve the configuration for a run on `root`.
///
/// `explicit` replaces the project file lookup when given; unlike the
/// implicit files, it must exist. `user_file` is normally
/// [`defaults::user_config_path`]. The CLI layer is applied last and the
/// result is validated.
pub fn load(
    root: &Path,
    explicit: Option<&Path>,
    user_file: Option<PathBuf>,
    cli: ConfigLayer,
) -> Result<SyncConfig> {
    let mut config = SyncConfig::default();

    if let Some(user_file) = user_file.filter(|p| p.is_file()) {
        debug!("Loading user configuration {}", user_file.display());
        config.apply(from_file(&user_file)?);
    }

    match explicit {
        Some(path) => {
            debug!("Loading configuration {}", path.display());
            config.apply(from_file(path)?);
        }
        None => {
            let project_file = root.join(defaults::PROJECT_CONFIG_FILE);
            if project_file.is_file() {
                debug!("Loading project configuration {}", project_file.display());
                config.apply(from_file(&project_file)?);
            }
        }
    }

    config.apply(cli);
    config.validate()?;
    Ok(config)
}
