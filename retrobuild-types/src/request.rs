use serde::{Deserialize, Serialize};

/// The batch description consumed from the upstream extraction stage.
///
/// `crates` entries are `"<name>-<version>"` strings; `commithash` selects
/// the historical compiler the batch must build under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    pub commithash: String,
    pub crates: Vec<String>,
    pub arch: String,
    pub target_triple: String,
}

impl BuildRequest {
    /// Full target string, e.g. `x86_64-pc-windows-msvc`.
    pub fn target(&self) -> String {
        format!("{}-{}", self.arch, self.target_triple)
    }
}
