mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use fs_err as fs;
use retrobuild_driver::{BuildSession, SessionConfig, ShellCargo, ShellRustup};
use retrobuild_types::{BuildProfile, BuildRequest, RunResult};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "retrobuild",
    version,
    about = "Builds a batch of third-party crates under a pinned historical toolchain, repairing manifests as needed."
)]
struct Cli {
    /// JSON build request: crate list, architecture, target triple, and the
    /// compiler commit hash to build under.
    #[arg(long)]
    input: Utf8PathBuf,

    /// Directory the run-result summary is written to.
    #[arg(long)]
    output: Utf8PathBuf,

    /// Path to the retrobuild.toml config file.
    #[arg(long, default_value = "retrobuild.toml")]
    cfg: Utf8PathBuf,

    /// Toolchain registry mapping compiler commit hashes to releases.
    #[arg(long, default_value = "data/rustc_hashes.json")]
    hashes: Utf8PathBuf,

    /// Cargo project directory (default: from config, or ./project).
    #[arg(long)]
    project_dir: Option<Utf8PathBuf>,

    /// Disable automatic manifest repair; a failing check skips its unit.
    #[arg(long, default_value_t = false)]
    no_repair: bool,

    /// Enable verbose logging.
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:?}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let file_config = config::load_or_default(&cli.cfg).context("load retrobuild.toml config")?;
    let project_dir = cli
        .project_dir
        .or(file_config.paths.project_dir)
        .unwrap_or_else(|| Utf8PathBuf::from("project"));

    info!(
        input = %cli.input,
        output = %cli.output,
        project_dir = %project_dir,
        "starting retrobuild"
    );

    let request = read_request(&cli.input)?;
    fs::create_dir_all(&cli.output).with_context(|| format!("create {}", cli.output))?;

    let session_config = SessionConfig {
        project_dir,
        registry_path: cli.hashes,
        profile: BuildProfile::Release,
        auto_repair: !cli.no_repair,
        extra_deny: file_config.manifest.deny,
    };

    let cargo = ShellCargo::default();
    let rustup = ShellRustup;
    let result = BuildSession::new(session_config, &cargo, &rustup)
        .run(&request)
        .context("compilation phase failed")?;

    info!("compiled crates:\n{}", result.compiled.join("\n"));
    if !result.failed.is_empty() {
        info!("failed crates:\n{}", result.failed.join("\n"));
    }

    write_result(&cli.output, &result)?;
    Ok(())
}

fn read_request(path: &Utf8Path) -> anyhow::Result<BuildRequest> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read build request {path}"))?;
    serde_json::from_str(&contents).with_context(|| format!("parse build request {path}"))
}

fn write_result(out_dir: &Utf8Path, result: &RunResult) -> anyhow::Result<()> {
    let path = out_dir.join("run-result.json");
    let json = serde_json::to_string_pretty(result).context("serialize run result")?;
    fs::write(&path, json).with_context(|| format!("write {path}"))?;
    info!("wrote run result to {}", path);
    Ok(())
}
