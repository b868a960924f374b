//! Historical toolchain selection.
//!
//! Maps a compiler commit hash to its release version through the scraped
//! registry file, then makes sure rustup has the toolchain and target
//! installed before the batch starts.

use crate::ports::RustupPort;
use anyhow::Context;
use camino::Utf8Path;
use fs_err as fs;
use serde::Deserialize;
use tracing::info;

/// Prefix length used when a registry record carries no full commit hash.
const SHORT_HASH_LEN: usize = 9;

/// One entry of the commit-hash → release-version registry.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainRecord {
    pub git_commit_hash: Option<String>,
    pub hash_short: String,
    pub version: String,
    pub version_short: String,
    /// Release date stamp; addresses nightlies, empty for stable releases.
    #[serde(default)]
    pub ts: String,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    rustc_hashes: Vec<ToolchainRecord>,
}

/// The scraped registry of historical compiler releases.
#[derive(Debug, Clone)]
pub struct ToolchainRegistry {
    records: Vec<ToolchainRecord>,
}

impl ToolchainRegistry {
    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("read toolchain registry {path}"))?;
        let parsed: RegistryFile = serde_json::from_str(&contents)
            .with_context(|| format!("parse toolchain registry {path}"))?;
        Ok(Self {
            records: parsed.rustc_hashes,
        })
    }

    pub fn from_records(records: Vec<ToolchainRecord>) -> Self {
        Self { records }
    }

    /// Match the full commit hash, or its 9-character prefix for records the
    /// scraper could not attribute a full hash to.
    pub fn resolve(&self, commithash: &str) -> Option<&ToolchainRecord> {
        let short = commithash.get(..SHORT_HASH_LEN).unwrap_or(commithash);
        self.records
            .iter()
            .find(|record| match &record.git_commit_hash {
                Some(full) => full == commithash,
                None => record.hash_short == short,
            })
    }
}

/// Rustup toolchain name for a resolved record: nightlies are addressed by
/// date stamp, releases by version.
pub fn toolchain_name(record: &ToolchainRecord, arch: &str, triple: &str) -> String {
    if record.version.contains("nightly") {
        format!("nightly-{}-{}-{}", record.ts, arch, triple)
    } else {
        format!("{}-{}-{}", record.version_short, arch, triple)
    }
}

/// Install the toolchain unless rustup already lists it.
pub fn ensure_toolchain(rustup: &dyn RustupPort, toolchain: &str) -> anyhow::Result<()> {
    let installed = rustup.installed_toolchains()?;
    // List entries may carry a ` (default)` suffix.
    if installed.iter().any(|entry| entry.starts_with(toolchain)) {
        return Ok(());
    }
    info!(toolchain, "installing toolchain");
    rustup.install_toolchain(toolchain)
}

/// Add the target unless rustup already has it installed.
pub fn ensure_target(rustup: &dyn RustupPort, target: &str) -> anyhow::Result<()> {
    let installed = rustup.installed_targets()?;
    if installed.iter().any(|entry| entry == target) {
        return Ok(());
    }
    info!(target, "adding target");
    rustup.add_target(target)
}
