//! Child-process-backed port implementations.

use crate::ports::{CapturedRun, CargoPort, RustupPort};
use anyhow::Context;
use camino::Utf8Path;
use std::process::Command;
use tracing::debug;

/// Cargo driven as a blocking child process.
#[derive(Debug, Clone)]
pub struct ShellCargo {
    binary: String,
}

impl Default for ShellCargo {
    fn default() -> Self {
        Self {
            binary: "cargo".to_string(),
        }
    }
}

impl ShellCargo {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl CargoPort for ShellCargo {
    fn run_captured(
        &self,
        project_dir: &Utf8Path,
        args: &[String],
    ) -> anyhow::Result<CapturedRun> {
        debug!(cmd = %args.join(" "), dir = %project_dir, "running captured invocation");
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(project_dir)
            .output()
            .with_context(|| format!("spawn {} {}", self.binary, args.join(" ")))?;
        Ok(CapturedRun {
            success: output.status.success(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn run_streamed(&self, project_dir: &Utf8Path, args: &[String]) -> anyhow::Result<bool> {
        debug!(cmd = %args.join(" "), dir = %project_dir, "running streamed invocation");
        let status = Command::new(&self.binary)
            .args(args)
            .current_dir(project_dir)
            .status()
            .with_context(|| format!("spawn {} {}", self.binary, args.join(" ")))?;
        Ok(status.success())
    }
}

/// Rustup driven as a blocking child process.
#[derive(Debug, Clone, Default)]
pub struct ShellRustup;

impl RustupPort for ShellRustup {
    fn installed_toolchains(&self) -> anyhow::Result<Vec<String>> {
        let output = Command::new("rustup")
            .args(["toolchain", "list"])
            .output()
            .context("spawn rustup toolchain list")?;
        anyhow::ensure!(output.status.success(), "rustup toolchain list failed");
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    fn install_toolchain(&self, toolchain: &str) -> anyhow::Result<()> {
        let status = Command::new("rustup")
            .args(["toolchain", "install", toolchain])
            .status()
            .context("spawn rustup toolchain install")?;
        anyhow::ensure!(status.success(), "rustup could not install toolchain {toolchain}");
        Ok(())
    }

    fn installed_targets(&self) -> anyhow::Result<Vec<String>> {
        let output = Command::new("rustup")
            .args(["target", "list"])
            .output()
            .context("spawn rustup target list")?;
        anyhow::ensure!(output.status.success(), "rustup target list failed");
        // Installed entries are marked `<target> (installed)`.
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| line.contains("(installed)"))
            .filter_map(|line| line.split_whitespace().next())
            .map(str::to_string)
            .collect())
    }

    fn add_target(&self, target: &str) -> anyhow::Result<()> {
        let status = Command::new("rustup")
            .args(["target", "add", target])
            .status()
            .context("spawn rustup target add")?;
        anyhow::ensure!(status.success(), "rustup could not add target {target}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    #[test]
    fn spawn_failure_is_an_error_not_a_failed_run() {
        let temp = TempDir::new().expect("temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        let cargo = ShellCargo::new("retrobuild-no-such-binary");

        let err = cargo
            .run_captured(&dir, &["check".to_string()])
            .expect_err("missing binary");
        assert!(err.to_string().contains("retrobuild-no-such-binary"));
    }
}
