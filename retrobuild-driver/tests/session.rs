//! End-to-end session tests with scripted cargo and rustup ports.

use camino::Utf8PathBuf;
use pretty_assertions::assert_eq;
use retrobuild_driver::{BuildSession, CapturedRun, CargoPort, RustupPort, SessionConfig};
use retrobuild_types::{BuildProfile, BuildRequest};
use std::cell::RefCell;
use tempfile::TempDir;

const REGISTRY: &str = r#"{
  "rustc_hashes": [
    {
      "git_commit_hash": "a28077b28a02b92985b3a3faecf92813155f1ea1",
      "hash_short": "a28077b28",
      "version": "rustc 1.63.0 (4b91a6ea7 2022-08-08)",
      "version_short": "1.63.0",
      "ts": ""
    }
  ]
}"#;

struct PassingCargo;

impl CargoPort for PassingCargo {
    fn run_captured(
        &self,
        _project_dir: &camino::Utf8Path,
        _args: &[String],
    ) -> anyhow::Result<CapturedRun> {
        Ok(CapturedRun {
            success: true,
            stderr: String::new(),
        })
    }

    fn run_streamed(
        &self,
        _project_dir: &camino::Utf8Path,
        _args: &[String],
    ) -> anyhow::Result<bool> {
        Ok(true)
    }
}

#[derive(Default)]
struct RecordingRustup {
    installed_toolchains: RefCell<Vec<String>>,
    added_targets: RefCell<Vec<String>>,
}

impl RustupPort for RecordingRustup {
    fn installed_toolchains(&self) -> anyhow::Result<Vec<String>> {
        Ok(vec![])
    }

    fn install_toolchain(&self, toolchain: &str) -> anyhow::Result<()> {
        self.installed_toolchains
            .borrow_mut()
            .push(toolchain.to_string());
        Ok(())
    }

    fn installed_targets(&self) -> anyhow::Result<Vec<String>> {
        Ok(vec![])
    }

    fn add_target(&self, target: &str) -> anyhow::Result<()> {
        self.added_targets.borrow_mut().push(target.to_string());
        Ok(())
    }
}

fn workspace() -> (TempDir, Utf8PathBuf, SessionConfig) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");

    let project_dir = root.join("project");
    std::fs::create_dir_all(&project_dir).expect("project dir");
    std::fs::write(
        project_dir.join("Cargo.toml"),
        "[package]\nname = \"retrobuild-project\"\nversion = \"0.1.0\"\nedition = \"2024\"\n",
    )
    .expect("write manifest");

    let registry_path = root.join("rustc_hashes.json");
    std::fs::write(&registry_path, REGISTRY).expect("write registry");

    let config = SessionConfig {
        project_dir: project_dir.clone(),
        registry_path,
        profile: BuildProfile::Release,
        auto_repair: true,
        extra_deny: vec![],
    };
    (temp, project_dir, config)
}

fn request(crates: &[&str]) -> BuildRequest {
    BuildRequest {
        commithash: "a28077b28a02b92985b3a3faecf92813155f1ea1".to_string(),
        crates: crates.iter().map(|s| s.to_string()).collect(),
        arch: "x86_64".to_string(),
        target_triple: "unknown-linux-gnu".to_string(),
    }
}

#[test]
fn session_prepares_manifests_and_reports_the_project_config() {
    let (_temp, project_dir, config) = workspace();
    let cargo = PassingCargo;
    let rustup = RecordingRustup::default();
    let session = BuildSession::new(config, &cargo, &rustup);

    let result = session
        .run(&request(&["alpha-1.0.0", "color-spantrace-0.2.0"]))
        .expect("run session");

    assert_eq!(result.compiled, vec!["alpha", "color-spantrace"]);
    assert!(result.failed.is_empty());
    assert_eq!(result.config.arch, "x86_64");
    assert_eq!(result.config.target, "x86_64-unknown-linux-gnu");
    assert_eq!(result.config.rust_version, "1.63.0");
    assert_eq!(result.config.toolchain, "1.63.0-x86_64-unknown-linux-gnu");
    assert_eq!(result.config.profile, BuildProfile::Release);

    // The toolchain and target were installed through rustup.
    assert_eq!(
        rustup.installed_toolchains.borrow().as_slice(),
        ["1.63.0-x86_64-unknown-linux-gnu"]
    );
    assert_eq!(
        rustup.added_targets.borrow().as_slice(),
        ["x86_64-unknown-linux-gnu"]
    );

    // All three configuration artifacts landed on disk.
    let manifest = std::fs::read_to_string(project_dir.join("Cargo.toml")).expect("read");
    assert!(manifest.contains("alpha = \"=1.0.0\""));
    assert!(manifest.contains("color-spantrace = \"=0.2.0\""));

    let toolchain = std::fs::read_to_string(project_dir.join("rust-toolchain")).expect("read");
    assert!(toolchain.contains("channel = \"1.63.0\""));
    assert!(toolchain.contains("\"x86_64-unknown-linux-gnu\""));

    let build_config =
        std::fs::read_to_string(project_dir.join(".cargo").join("config.toml")).expect("read");
    assert!(build_config.contains("target = \"x86_64-unknown-linux-gnu\""));
}

#[test]
fn malformed_crate_entries_are_dropped() {
    let (_temp, project_dir, config) = workspace();
    let cargo = PassingCargo;
    let rustup = RecordingRustup::default();
    let session = BuildSession::new(config, &cargo, &rustup);

    let result = session
        .run(&request(&["alpha-1.0.0", "not-a-version"]))
        .expect("run session");

    assert_eq!(result.compiled, vec!["alpha"]);
    let manifest = std::fs::read_to_string(project_dir.join("Cargo.toml")).expect("read");
    assert!(!manifest.contains("not-a-version"));
}

#[test]
fn unresolvable_commit_hash_aborts_the_run() {
    let (_temp, _project_dir, config) = workspace();
    let cargo = PassingCargo;
    let rustup = RecordingRustup::default();
    let session = BuildSession::new(config, &cargo, &rustup);

    let mut req = request(&["alpha-1.0.0"]);
    req.commithash = "ffffffffffffffffffffffffffffffffffffffff".to_string();

    let err = session.run(&req).expect_err("unknown hash");
    assert!(err.to_string().contains("no toolchain entry"));
}

#[test]
fn missing_manifest_aborts_before_any_unit() {
    let (_temp, project_dir, config) = workspace();
    std::fs::remove_file(project_dir.join("Cargo.toml")).expect("remove manifest");
    let cargo = PassingCargo;
    let rustup = RecordingRustup::default();
    let session = BuildSession::new(config, &cargo, &rustup);

    let err = session.run(&request(&["alpha-1.0.0"])).expect_err("missing manifest");
    assert!(format!("{err:#}").contains("not found"));
}
