//! The remediation table: one repair action per diagnostic taxonomy value.

use crate::command::UnitCommands;
use crate::ports::CargoPort;
use retrobuild_manifest::{ManifestError, ManifestStore};
use retrobuild_types::{Diagnostic, RepairOutcome};
use tracing::{info, warn};

/// A concrete manifest or invocation mutation.
///
/// The runner remembers the last action applied per unit; a unit that keeps
/// provoking the identical action is abandoned instead of looping forever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairAction {
    RelaxConstraint { name: String },
    PreciseDowngrade { name: String, version: String },
    RemoveManifestLine { line: usize },
    RemoveDependency { name: String },
    DowngradeEdition,
    DisambiguateSelector { name: String },
}

/// The action for a diagnostic, or `None` when nothing can be done
/// (`Unknown` diagnostics are left for manual follow-up).
pub fn plan_repair(diagnostic: &Diagnostic) -> Option<RepairAction> {
    match diagnostic {
        Diagnostic::InvalidVersion { name, .. }
        | Diagnostic::InvalidVersionForRequiredPackage { name } => {
            Some(RepairAction::RelaxConstraint { name: name.clone() })
        }
        Diagnostic::VersionTooHigh { name, version } => Some(RepairAction::PreciseDowngrade {
            name: name.clone(),
            version: version.clone(),
        }),
        Diagnostic::InvalidCrate { line } | Diagnostic::SyntaxErrorCrate { line } => {
            Some(RepairAction::RemoveManifestLine { line: *line })
        }
        Diagnostic::NoMatchingPackage { name } => Some(RepairAction::RemoveDependency {
            name: name.clone(),
        }),
        Diagnostic::WrongEdition { .. } | Diagnostic::EditionTooNew { .. } => {
            Some(RepairAction::DowngradeEdition)
        }
        Diagnostic::MultiplePackageVersions { name } => {
            Some(RepairAction::DisambiguateSelector { name: name.clone() })
        }
        Diagnostic::Unknown => None,
    }
}

/// Applies repair actions against the manifest store, the toolchain, and the
/// current invocation.
pub struct Repairer<'a> {
    store: &'a ManifestStore,
    cargo: &'a dyn CargoPort,
}

impl<'a> Repairer<'a> {
    pub fn new(store: &'a ManifestStore, cargo: &'a dyn CargoPort) -> Self {
        Self { store, cargo }
    }

    /// Apply one action. `Err` is reserved for manifest I/O going wrong; a
    /// repair the toolchain or manifest state rules out comes back as
    /// [`RepairOutcome::Unrecoverable`].
    pub fn apply(
        &self,
        action: &RepairAction,
        commands: &mut UnitCommands,
    ) -> anyhow::Result<RepairOutcome> {
        match action {
            RepairAction::RelaxConstraint { name } => self.relax_constraint(name),
            RepairAction::PreciseDowngrade { name, version } => {
                self.precise_downgrade(name, version)
            }
            RepairAction::RemoveManifestLine { line } => {
                info!(line, "removing broken manifest line");
                self.store.remove_line(*line)?;
                Ok(RepairOutcome::Resolved)
            }
            RepairAction::RemoveDependency { name } => {
                info!(name = name.as_str(), "removing dependency with no matching package");
                self.store.remove_dependency(name)?;
                Ok(RepairOutcome::Resolved)
            }
            RepairAction::DowngradeEdition => self.downgrade_edition(),
            RepairAction::DisambiguateSelector { name } => {
                self.disambiguate_selector(name, commands)
            }
        }
    }

    fn relax_constraint(&self, name: &str) -> anyhow::Result<RepairOutcome> {
        let Some(constraint) = self.store.dependency_version(name)? else {
            warn!(name, "no dependency entry to relax");
            return Ok(RepairOutcome::Unrecoverable);
        };
        let relaxed = constraint.strip_prefix('=').unwrap_or(&constraint).to_string();
        self.store.set_dependency_version(name, &relaxed)?;
        info!(name, constraint = relaxed.as_str(), "relaxed exact constraint to minimum version");
        Ok(RepairOutcome::Resolved)
    }

    fn precise_downgrade(&self, name: &str, version: &str) -> anyhow::Result<RepairOutcome> {
        let Some(lower) = next_lower_version(version) else {
            warn!(name, version, "cannot compute a lower version");
            return Ok(RepairOutcome::Unrecoverable);
        };
        let args = vec![
            "update".to_string(),
            "-p".to_string(),
            format!("{name}@{version}"),
            "--precise".to_string(),
            lower.clone(),
        ];
        info!(name, from = version, to = lower.as_str(), "downgrading via cargo update --precise");
        match self.cargo.run_streamed(self.store.project_dir(), &args) {
            Ok(true) => Ok(RepairOutcome::Resolved),
            Ok(false) => {
                warn!(name, "precise downgrade rejected by the toolchain");
                Ok(RepairOutcome::Unrecoverable)
            }
            Err(err) => {
                warn!(name, error = %err, "precise downgrade could not be launched");
                Ok(RepairOutcome::Unrecoverable)
            }
        }
    }

    fn downgrade_edition(&self) -> anyhow::Result<RepairOutcome> {
        match self.store.downgrade_edition() {
            Ok(edition) => {
                info!(edition = edition.as_str(), "downgraded package edition");
                Ok(RepairOutcome::Resolved)
            }
            Err(ManifestError::NoLowerEdition { edition }) => {
                warn!(edition = edition.as_str(), "already at the oldest edition");
                Ok(RepairOutcome::Unrecoverable)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn disambiguate_selector(
        &self,
        name: &str,
        commands: &mut UnitCommands,
    ) -> anyhow::Result<RepairOutcome> {
        if commands.build.package_selector() != Some(name) {
            warn!(name, "ambiguous package does not match the current selector");
            return Ok(RepairOutcome::Unrecoverable);
        }
        let Some(constraint) = self.store.dependency_version(name)? else {
            warn!(name, "no dependency entry to disambiguate against");
            return Ok(RepairOutcome::Unrecoverable);
        };
        // Only an exact `=x.y.z` constraint pins the ambiguity down.
        let Some(version) = constraint.strip_prefix('=') else {
            warn!(name, constraint = constraint.as_str(), "constraint is not exact");
            return Ok(RepairOutcome::Unrecoverable);
        };
        if !version.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            warn!(name, constraint = constraint.as_str(), "constraint has no concrete version");
            return Ok(RepairOutcome::Unrecoverable);
        }
        let selector = format!("{name}@{version}");
        info!(selector = selector.as_str(), "using disambiguated package selector");
        commands.set_package_selector(&selector);
        Ok(RepairOutcome::ResolvedKeepCommand)
    }
}

/// Strictly-lower version: decrement the last non-zero numeric component and
/// zero everything after it. `None` when every component is zero or the
/// version does not parse as dotted integers.
pub(crate) fn next_lower_version(version: &str) -> Option<String> {
    let mut parts: Vec<u64> = Vec::new();
    for part in version.split('.') {
        parts.push(part.parse().ok()?);
    }
    for i in (0..parts.len()).rev() {
        if parts[i] > 0 {
            parts[i] -= 1;
            for p in parts.iter_mut().skip(i + 1) {
                *p = 0;
            }
            return Some(
                parts
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join("."),
            );
        }
    }
    None
}
