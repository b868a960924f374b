//! Shared data model for retrobuild.
//!
//! This crate owns the values that cross component boundaries: compile units,
//! classified diagnostics, repair outcomes, and the run-result summary handed
//! to downstream consumers. It contains no I/O.

mod diagnostic;
mod request;
mod result;
mod unit;

pub use diagnostic::{Diagnostic, RepairOutcome};
pub use request::BuildRequest;
pub use result::{BuildProfile, ProjectConfig, RunResult};
pub use unit::CompileUnit;
