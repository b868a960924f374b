//! One full batch: toolchain selection, manifest preparation, build loop.

use crate::ports::{CargoPort, RustupPort};
use crate::runner::BuildRunner;
use crate::toolchain::{self, ToolchainRegistry};
use anyhow::Context;
use camino::Utf8PathBuf;
use retrobuild_manifest::ManifestStore;
use retrobuild_types::{BuildProfile, BuildRequest, CompileUnit, ProjectConfig, RunResult};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Session-level knobs, resolved by the caller from CLI flags and the
/// config file.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub project_dir: Utf8PathBuf,
    pub registry_path: Utf8PathBuf,
    pub profile: BuildProfile,
    pub auto_repair: bool,
    pub extra_deny: Vec<String>,
}

/// Runs one build request end to end.
pub struct BuildSession<'a> {
    config: SessionConfig,
    cargo: &'a dyn CargoPort,
    rustup: &'a dyn RustupPort,
}

impl<'a> BuildSession<'a> {
    pub fn new(
        config: SessionConfig,
        cargo: &'a dyn CargoPort,
        rustup: &'a dyn RustupPort,
    ) -> Self {
        Self {
            config,
            cargo,
            rustup,
        }
    }

    /// Run the whole batch.
    ///
    /// Errors here are run-scoped: an unresolvable commit hash or a missing
    /// package manifest aborts before any unit is attempted. Per-unit
    /// failures land in the result's `failed` list instead.
    pub fn run(&self, request: &BuildRequest) -> anyhow::Result<RunResult> {
        let registry = ToolchainRegistry::load(&self.config.registry_path)?;
        let record = registry.resolve(&request.commithash).with_context(|| {
            format!("no toolchain entry for commit hash {}", request.commithash)
        })?;
        info!(
            commithash = request.commithash.as_str(),
            version = record.version_short.as_str(),
            "resolved compiler version"
        );

        let target = request.target();
        let toolchain = toolchain::toolchain_name(record, &request.arch, &request.target_triple);
        toolchain::ensure_toolchain(self.rustup, &toolchain)?;
        toolchain::ensure_target(self.rustup, &target)?;

        let store = ManifestStore::new(self.config.project_dir.clone())
            .with_extra_denylist(&self.config.extra_deny);
        store.load().context("load package manifest")?;

        let mut units = Vec::new();
        let mut entries = BTreeMap::new();
        for raw in &request.crates {
            match CompileUnit::parse(raw) {
                Some(unit) => {
                    entries.insert(unit.name.clone(), unit.exact_constraint());
                    units.push(unit);
                }
                None => warn!(entry = raw.as_str(), "not a name-version pair, dropped"),
            }
        }
        store
            .upsert_dependencies(&entries)
            .context("insert crate dependencies")?;
        store
            .write_toolchain_descriptor(&record.version_short, &[target.as_str()])
            .context("write toolchain descriptor")?;
        store
            .write_build_target(&target)
            .context("write build target")?;

        info!(units = units.len(), "building crates now");
        let outcome = BuildRunner::new(
            &store,
            self.cargo,
            self.config.profile,
            self.config.auto_repair,
        )
        .run(&units);

        Ok(RunResult {
            compiled: outcome.compiled,
            failed: outcome.failed,
            config: ProjectConfig {
                arch: request.arch.clone(),
                target,
                rust_version: record.version_short.clone(),
                toolchain,
                project_dir: self.config.project_dir.clone(),
                profile: self.config.profile,
            },
        })
    }
}
