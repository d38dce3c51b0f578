//! Bundle engine error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Result alias used throughout the bundle engine.
pub type Result<T, E = BundleError> = std::result::Result<T, E>;

/// Errors raised while loading, building or looking up bundles.
#[derive(Debug, Error)]
pub enum BundleError {
    /// Declaration file missing or unparsable.
    #[error("bundle configuration error")]
    Configuration(#[from] ConfigError),

    /// Declaration file parsed to an empty or null document.
    #[error("no bundles declared in `{}`", .0.display())]
    NoBundlesDeclared(PathBuf),

    #[error("no handler registered for \"{tag}\" bundles (bundle `{bundle}`)")]
    UnknownBundleType { bundle: String, tag: String },

    #[error("file `{file}` in bundle `{bundle}` does not exist")]
    MissingSourceFile { bundle: String, file: String },

    #[error("invalid definition for bundle `{bundle}`: {reason}")]
    InvalidBundleDefinition { bundle: String, reason: String },

    #[error("bundle `{0}` not found")]
    BundleNotFound(String),

    #[error("`{}` exists but is not a directory", .0.display())]
    OutputPathConflict(PathBuf),

    #[error("IO error on `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

impl BundleError {
    /// Wrap an IO error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io(path.into(), err)
    }
}
