//! The per-unit build state machine and batch loop.

use crate::command::UnitCommands;
use crate::ports::CargoPort;
use crate::repair::{RepairAction, Repairer, plan_repair};
use retrobuild_diagnose::classify;
use retrobuild_manifest::ManifestStore;
use retrobuild_types::{BuildProfile, CompileUnit, RepairOutcome};
use tracing::{debug, error, info, warn};

/// Which units compiled and which were abandoned, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub compiled: Vec<String>,
    pub failed: Vec<String>,
}

enum UnitStatus {
    Compiled,
    Failed,
}

/// Drives every compile unit to compiled or failed, one at a time, in input
/// order. A unit's failure never blocks the ones after it; the batch always
/// completes.
pub struct BuildRunner<'a> {
    store: &'a ManifestStore,
    cargo: &'a dyn CargoPort,
    profile: BuildProfile,
    auto_repair: bool,
}

impl<'a> BuildRunner<'a> {
    pub fn new(
        store: &'a ManifestStore,
        cargo: &'a dyn CargoPort,
        profile: BuildProfile,
        auto_repair: bool,
    ) -> Self {
        Self {
            store,
            cargo,
            profile,
            auto_repair,
        }
    }

    pub fn run(&self, units: &[CompileUnit]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for unit in units {
            match self.run_unit(unit) {
                UnitStatus::Compiled => outcome.compiled.push(unit.name.clone()),
                UnitStatus::Failed => outcome.failed.push(unit.name.clone()),
            }
        }
        outcome
    }

    fn run_unit(&self, unit: &CompileUnit) -> UnitStatus {
        let repairer = Repairer::new(self.store, self.cargo);
        let mut commands = UnitCommands::for_package(self.profile, &unit.name);
        // Progress bound: when a repair identical to the previous one comes
        // up again, the manifest is not converging and the unit is abandoned
        // instead of looping.
        let mut last_action: Option<RepairAction> = None;

        loop {
            debug!(unit = unit.name.as_str(), cmd = %commands.check.display(), "checking");
            let check = match self
                .cargo
                .run_captured(self.store.project_dir(), commands.check.args())
            {
                Ok(run) => run,
                Err(err) => {
                    error!(
                        unit = unit.name.as_str(),
                        error = %err,
                        "check invocation could not be launched, skipping unit"
                    );
                    return UnitStatus::Failed;
                }
            };

            if check.success {
                debug!(unit = unit.name.as_str(), cmd = %commands.build.display(), "check passed, building");
                return match self
                    .cargo
                    .run_streamed(self.store.project_dir(), commands.build.args())
                {
                    Ok(true) => {
                        info!(unit = unit.name.as_str(), "compiled");
                        UnitStatus::Compiled
                    }
                    Ok(false) => {
                        error!(unit = unit.name.as_str(), "build failed, skipping unit");
                        UnitStatus::Failed
                    }
                    Err(err) => {
                        error!(
                            unit = unit.name.as_str(),
                            error = %err,
                            "build invocation could not be launched, skipping unit"
                        );
                        UnitStatus::Failed
                    }
                };
            }

            if !self.auto_repair {
                info!(
                    unit = unit.name.as_str(),
                    "check failed and repair is disabled, skipping unit"
                );
                return UnitStatus::Failed;
            }

            let diagnostic = classify(&check.stderr);
            debug!(unit = unit.name.as_str(), ?diagnostic, "classified check failure");

            let Some(action) = plan_repair(&diagnostic) else {
                info!(
                    unit = unit.name.as_str(),
                    "unknown diagnostic, fix manually; skipping unit"
                );
                return UnitStatus::Failed;
            };

            if last_action.as_ref() == Some(&action) {
                warn!(
                    unit = unit.name.as_str(),
                    ?action,
                    "identical repair would be applied twice in a row, skipping unit"
                );
                return UnitStatus::Failed;
            }

            let outcome = match repairer.apply(&action, &mut commands) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(unit = unit.name.as_str(), error = %err, "repair failed, skipping unit");
                    return UnitStatus::Failed;
                }
            };

            match outcome {
                RepairOutcome::Resolved => {
                    info!(unit = unit.name.as_str(), "repair applied, retrying check");
                    commands = UnitCommands::for_package(self.profile, &unit.name);
                }
                RepairOutcome::ResolvedKeepCommand => {
                    info!(
                        unit = unit.name.as_str(),
                        "repair applied, retrying with the rewritten invocation"
                    );
                }
                RepairOutcome::Unrecoverable => {
                    info!(unit = unit.name.as_str(), "repair not possible, skipping unit");
                    return UnitStatus::Failed;
                }
            }
            last_action = Some(action);
        }
    }
}
