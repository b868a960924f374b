//! Compilation driver.
//!
//! Iterates compile units against an external Cargo/rustup toolchain: a
//! cheap check per unit, classification of check failures, a manifest
//! repair, and a retry, until the unit compiles or is abandoned. All
//! child-process I/O goes through the port traits in [`ports`] so the loop
//! can be tested against scripted stubs.

mod command;
mod invoke;
mod ports;
mod repair;
mod runner;
mod session;
mod toolchain;

pub use command::{CargoCommand, UnitCommands};
pub use invoke::{ShellCargo, ShellRustup};
pub use ports::{CapturedRun, CargoPort, RustupPort};
pub use repair::{RepairAction, Repairer, plan_repair};
pub use runner::{BatchOutcome, BuildRunner};
pub use session::{BuildSession, SessionConfig};
pub use toolchain::{
    ToolchainRecord, ToolchainRegistry, ensure_target, ensure_toolchain, toolchain_name,
};
