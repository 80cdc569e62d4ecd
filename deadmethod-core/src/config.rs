//! Configuration loading from deadmethod.toml.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::usage::Attribution;

pub const CONFIG_FILE: &str = "deadmethod.toml";

/// Main configuration structure for deadmethod.toml.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DeadmethodConfig {
    /// Method names never reported.
    pub ignore: Option<Vec<String>>,
    /// Regular expressions; matching method names are never reported.
    pub ignore_patterns: Option<Vec<String>>,
    /// Promoted-method attribution policy.
    pub attribution: Option<Attribution>,
    /// Extra directory names to skip while discovering snapshots.
    pub exclude: Option<Vec<String>>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Output format configuration.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl DeadmethodConfig {
    /// Compile `ignore_patterns`.
    pub fn compiled_patterns(&self) -> Result<Vec<Regex>> {
        self.ignore_patterns
            .iter()
            .flatten()
            .map(|p| Regex::new(p).with_context(|| format!("Invalid ignore pattern {:?}", p)))
            .collect()
    }

    pub fn wants_json(&self) -> bool {
        self.output
            .as_ref()
            .and_then(|o| o.format.as_deref())
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Directory holding the config for an analysis root. A file root (single
/// snapshot) uses its parent directory.
pub fn config_dir(root: &Path) -> &Path {
    if root.is_file() {
        root.parent().unwrap_or(root)
    } else {
        root
    }
}

/// Loads configuration from deadmethod.toml if it exists.
pub fn load_config(root: &Path) -> Result<Option<DeadmethodConfig>> {
    let path = config_dir(root).join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Cannot read {}", path.display()))?;
    let cfg: DeadmethodConfig = toml::from_str(&content).context("Invalid deadmethod.toml")?;
    cfg.compiled_patterns()?;
    Ok(Some(cfg))
}
