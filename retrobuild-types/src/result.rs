use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Build profile used for every invocation in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildProfile {
    #[default]
    Release,
    Debug,
}

impl BuildProfile {
    /// Extra cargo flag for this profile, if any (debug is cargo's default).
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            BuildProfile::Release => Some("--release"),
            BuildProfile::Debug => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildProfile::Release => "release",
            BuildProfile::Debug => "debug",
        }
    }
}

/// Resolved project configuration, snapshotted into the run result for the
/// downstream signature and diffing stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub arch: String,
    pub target: String,
    pub rust_version: String,
    pub toolchain: String,
    pub project_dir: Utf8PathBuf,
    pub profile: BuildProfile,
}

/// Outcome of one batch: which units compiled, which were abandoned, and the
/// configuration they were built under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub compiled: Vec<String>,
    pub failed: Vec<String>,
    pub config: ProjectConfig,
}
