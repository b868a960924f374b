/// A classified toolchain diagnostic, one variant per failure class the
/// repair engine knows how to react to.
///
/// Entity fields carry whatever the diagnostic text named: the offending
/// package, the rejected version, or the manifest line to cut.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// No version satisfies an exact `name = version` requirement.
    InvalidVersion { name: String, version: String },

    /// The solver could not select any version for the named package.
    InvalidVersionForRequiredPackage { name: String },

    /// The toolchain suggested a precise downgrade, or a package requires a
    /// newer compiler than the active one.
    VersionTooHigh { name: String, version: String },

    /// The manifest failed to parse; the diagnostic names the broken line.
    InvalidCrate { line: usize },

    /// A generic parse error whose follow-up line names the manifest line.
    SyntaxErrorCrate { line: usize },

    /// No package with the given name exists in the registry.
    NoMatchingPackage { name: String },

    /// The manifest requires a Cargo feature gate the active toolchain does
    /// not have stabilized.
    WrongEdition { feature: String },

    /// The manifest edition is newer than the active toolchain supports.
    EditionTooNew { edition: String },

    /// Multiple versions of one package make the bare-name selector ambiguous.
    MultiplePackageVersions { name: String },

    /// Nothing in the diagnostic text matched a known pattern.
    Unknown,
}

/// What a remediation attempt decided about the current unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairOutcome {
    /// The manifest was mutated; retry the unit with freshly built
    /// invocation arguments.
    Resolved,

    /// The invocation arguments themselves were mutated; retry the unit
    /// reusing them verbatim.
    ResolvedKeepCommand,

    /// No repair is possible; abandon the unit.
    Unrecoverable,
}
