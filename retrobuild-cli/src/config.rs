//! Configuration file loading for retrobuild.
//!
//! `retrobuild.toml` carries the settings that rarely change between runs:
//! the project directory the batch compiles in and extra denylist fragments
//! for the manifest store. CLI arguments take precedence.

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// Top-level configuration from retrobuild.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RetrobuildConfig {
    pub paths: PathsConfig,
    pub manifest: ManifestConfig,
}

/// Paths section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the cargo project the batch compiles in.
    pub project_dir: Option<Utf8PathBuf>,
}

/// Manifest section of the config.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Extra name fragments to deny when inserting dependencies, on top of
    /// the built-in extraction-noise denylist.
    pub deny: Vec<String>,
}

/// Load and parse a retrobuild.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<RetrobuildConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<RetrobuildConfig> {
    let config: RetrobuildConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `path`, or return the default if the file is absent.
pub fn load_or_default(path: &Utf8Path) -> anyhow::Result<RetrobuildConfig> {
    if path.exists() {
        load_config(path)
    } else {
        debug!("no config file found at {}", path);
        Ok(RetrobuildConfig::default())
    }
}
