use regex::Regex;
use std::sync::LazyLock;

/// `<name>-<version>` split on the last hyphen followed by a digit, so crate
/// names that themselves contain hyphens survive (`color-spantrace-0.2.0`).
static UNIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*)-(\d+\..*)$").expect("unit pattern"));

/// One dependency package to validate and build: a name plus the pinned
/// version the upstream extraction reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileUnit {
    pub name: String,
    pub version: String,
}

impl CompileUnit {
    /// Parse a `"<name>-<version>"` string. Returns `None` when the string
    /// has no version suffix; callers decide whether to log or drop it.
    pub fn parse(raw: &str) -> Option<Self> {
        let caps = UNIT_RE.captures(raw)?;
        Some(Self {
            name: caps[1].to_string(),
            version: caps[2].to_string(),
        })
    }

    /// The exact (`=`) constraint written into the manifest for this unit.
    pub fn exact_constraint(&self) -> String {
        format!("={}", self.version)
    }
}
