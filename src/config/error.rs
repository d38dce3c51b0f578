//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading `fardel.toml` or the bundle declarations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("bundle declarations parsing error")]
    Yaml(#[from] serde_yaml::Error),

    #[error("settings file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
