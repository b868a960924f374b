use crate::edition;
use crate::error::{ManifestError, ManifestResult};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;
use toml_edit::{Array, DocumentMut, Item, value};
use tracing::{debug, info};

/// Dependency names carrying these fragments are extraction noise (paths,
/// URLs) and are never written into the manifest.
const DEFAULT_DENYLIST: &[&str] = &[".cargo", "github.com", "\\"];

/// Data-access layer for the persisted build configuration of one project
/// directory.
///
/// Each operation follows the same read-merge-write discipline: load the
/// file, mutate the parsed document, rewrite the file. Unrelated fields are
/// preserved because the whole document is re-read before every mutation.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    project_dir: Utf8PathBuf,
    denylist: Vec<String>,
}

impl ManifestStore {
    pub fn new(project_dir: Utf8PathBuf) -> Self {
        Self {
            project_dir,
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Extend the built-in denylist with additional name fragments.
    pub fn with_extra_denylist(mut self, extra: &[String]) -> Self {
        for frag in extra {
            if !self.denylist.contains(frag) {
                self.denylist.push(frag.clone());
            }
        }
        self
    }

    pub fn project_dir(&self) -> &Utf8Path {
        &self.project_dir
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.project_dir.join("Cargo.toml")
    }

    pub fn toolchain_path(&self) -> Utf8PathBuf {
        self.project_dir.join("rust-toolchain")
    }

    pub fn build_config_path(&self) -> Utf8PathBuf {
        self.project_dir.join(".cargo").join("config.toml")
    }

    /// Verify the package manifest exists and parses.
    ///
    /// Called once before a batch; a missing manifest aborts the run before
    /// any unit is attempted.
    pub fn load(&self) -> ManifestResult<()> {
        self.read_manifest().map(|_| ())
    }

    /// Set or overwrite dependency entries, creating the `[dependencies]`
    /// section if absent. Denylisted names are skipped.
    pub fn upsert_dependencies(&self, entries: &BTreeMap<String, String>) -> ManifestResult<()> {
        let mut doc = self.read_manifest()?;
        for (name, constraint) in entries {
            if self.denied(name) {
                debug!(name = name.as_str(), "skipping denylisted dependency");
                continue;
            }
            doc["dependencies"][name.as_str()] = value(constraint.as_str());
        }
        self.write(&self.manifest_path(), &doc)
    }

    /// Current version constraint for `name`, or `None` when the entry is
    /// absent.
    pub fn dependency_version(&self, name: &str) -> ManifestResult<Option<String>> {
        let doc = self.read_manifest()?;
        Ok(doc
            .get("dependencies")
            .and_then(Item::as_table)
            .and_then(|table| table.get(name))
            .and_then(Item::as_value)
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }

    /// Overwrite the version constraint for a single dependency.
    pub fn set_dependency_version(&self, name: &str, constraint: &str) -> ManifestResult<()> {
        let mut doc = self.read_manifest()?;
        doc["dependencies"][name] = value(constraint);
        info!(name, constraint, "updated dependency constraint");
        self.write(&self.manifest_path(), &doc)
    }

    /// Remove a dependency entry. Succeeds when the entry is already absent.
    pub fn remove_dependency(&self, name: &str) -> ManifestResult<()> {
        let mut doc = self.read_manifest()?;
        if let Some(table) = doc.get_mut("dependencies").and_then(Item::as_table_mut) {
            table.remove(name);
        }
        self.write(&self.manifest_path(), &doc)
    }

    /// Step the `package.edition` field one rung down the edition ladder.
    ///
    /// Returns the new edition, or [`ManifestError::NoLowerEdition`] when the
    /// current value is the oldest known edition or unrecognized.
    pub fn downgrade_edition(&self) -> ManifestResult<String> {
        let mut doc = self.read_manifest()?;
        let current = doc
            .get("package")
            .and_then(Item::as_table)
            .and_then(|table| table.get("edition"))
            .and_then(Item::as_value)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let Some(lower) = edition::next_lower(&current) else {
            return Err(ManifestError::NoLowerEdition { edition: current });
        };

        doc["package"]["edition"] = value(lower);
        info!(from = current.as_str(), to = lower, "downgraded edition");
        self.write(&self.manifest_path(), &doc)?;
        Ok(lower.to_string())
    }

    /// Write the toolchain descriptor: channel plus target list, creating the
    /// `[toolchain]` section on first use.
    pub fn write_toolchain_descriptor(&self, channel: &str, targets: &[&str]) -> ManifestResult<()> {
        let path = self.toolchain_path();
        let mut doc = self.read_optional(&path)?;
        doc["toolchain"]["channel"] = value(channel);
        let mut list = Array::new();
        for target in targets {
            list.push(*target);
        }
        doc["toolchain"]["targets"] = value(list);
        self.write(&path, &doc)
    }

    /// Write the single build target into `.cargo/config.toml`.
    ///
    /// The value is a plain string, not an array: older toolchains reject the
    /// array form for this key.
    pub fn write_build_target(&self, target: &str) -> ManifestResult<()> {
        let path = self.build_config_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ManifestError::io(format!("create {parent}"), e))?;
        }
        let mut doc = self.read_optional(&path)?;
        doc["build"]["target"] = value(target);
        self.write(&path, &doc)
    }

    /// Delete one physical line (1-indexed) from the raw manifest text.
    ///
    /// This bypasses TOML parsing entirely: the diagnostics that drive it
    /// report syntactically broken manifests by line number, and a broken
    /// manifest may not parse at all.
    pub fn remove_line(&self, line: usize) -> ManifestResult<()> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(ManifestError::ManifestMissing { path });
        }
        let contents = fs::read_to_string(&path)
            .map_err(|e| ManifestError::io(format!("read {path}"), e))?;
        let mut lines: Vec<&str> = contents.split_inclusive('\n').collect();
        if line == 0 || line > lines.len() {
            debug!(line, total = lines.len(), "line out of range, manifest unchanged");
            return Ok(());
        }
        lines.remove(line - 1);
        fs::write(&path, lines.concat())
            .map_err(|e| ManifestError::io(format!("write {path}"), e))
    }

    fn denied(&self, name: &str) -> bool {
        self.denylist.iter().any(|frag| name.contains(frag.as_str()))
    }

    fn read_manifest(&self) -> ManifestResult<DocumentMut> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(ManifestError::ManifestMissing { path });
        }
        self.read(&path)
    }

    /// Read a descriptor file that may not exist yet; absent files start as
    /// an empty document.
    fn read_optional(&self, path: &Utf8Path) -> ManifestResult<DocumentMut> {
        if !path.exists() {
            return Ok(DocumentMut::new());
        }
        self.read(path)
    }

    fn read(&self, path: &Utf8Path) -> ManifestResult<DocumentMut> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ManifestError::io(format!("read {path}"), e))?;
        contents.parse().map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn write(&self, path: &Utf8Path, doc: &DocumentMut) -> ManifestResult<()> {
        fs::write(path, doc.to_string())
            .map_err(|e| ManifestError::io(format!("write {path}"), e))
    }
}
