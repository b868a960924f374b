//! Port traits abstracting the external toolchain away from the driver.

use camino::Utf8Path;

/// One captured invocation: whether the toolchain reported success, plus the
/// collected stderr for diagnosis.
#[derive(Debug, Clone)]
pub struct CapturedRun {
    pub success: bool,
    pub stderr: String,
}

/// Cargo invocations, working directory passed explicitly on every call.
///
/// `Err` means the process could not be launched at all; a toolchain-reported
/// failure comes back as `success == false` with its stderr.
pub trait CargoPort {
    /// Run `cargo` with `args` in `project_dir`, capturing stderr.
    fn run_captured(&self, project_dir: &Utf8Path, args: &[String])
    -> anyhow::Result<CapturedRun>;

    /// Run `cargo` with `args` in `project_dir`, streaming output to the
    /// operator.
    fn run_streamed(&self, project_dir: &Utf8Path, args: &[String]) -> anyhow::Result<bool>;
}

/// Rustup queries and installs used during toolchain setup.
pub trait RustupPort {
    fn installed_toolchains(&self) -> anyhow::Result<Vec<String>>;
    fn install_toolchain(&self, toolchain: &str) -> anyhow::Result<()>;
    fn installed_targets(&self) -> anyhow::Result<Vec<String>>;
    fn add_target(&self, target: &str) -> anyhow::Result<()>;
}
