//! Error types for manifest-store operations.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failures raised by [`crate::ManifestStore`].
///
/// `ManifestMissing` is the only run-fatal case; everything else is scoped
/// to the unit whose repair triggered the operation.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The package manifest does not exist at the expected path.
    #[error("package manifest not found at {path}")]
    ManifestMissing { path: Utf8PathBuf },

    /// The current edition is already the oldest known value, or is not a
    /// recognized edition identifier.
    #[error("edition `{edition}` cannot be downgraded further")]
    NoLowerEdition { edition: String },

    /// A manifest file exists but is not parseable TOML.
    #[error("parse {path}")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },

    /// An underlying read or write failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ManifestError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type alias using [`ManifestError`].
pub type ManifestResult<T> = Result<T, ManifestError>;
