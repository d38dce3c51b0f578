//! Settings (`fardel.toml`) and bundle declarations (`bundles.yaml`).
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/   # [compress], [lint], [watch]
//! ├── declare    # bundles.yaml -> ordered BundleDescriptors
//! ├── error      # ConfigError
//! └── mod.rs     # Settings (this file)
//! ```
//!
//! Every settings key has a default, so a project with only a
//! `bundles.yaml` works without a `fardel.toml`.

mod declare;
mod error;
pub mod section;

pub use declare::{parse_declarations, read_declarations};
pub use error::ConfigError;
pub use section::{CompressConfig, LintConfig, WatchConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::log;

/// Default settings file name, looked up in the project directory.
pub const SETTINGS_FILE: &str = "fardel.toml";

/// Name of the artifact directory under the media root.
pub const BUNDLES_DIR: &str = "bundles";

/// Tool settings. Immutable after loading; share as `Arc<Settings>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Project directory holding `bundles.yaml` (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Directory all member files are resolved against
    pub media_root: PathBuf,

    /// URL prefix of the media root, used for per-file includes
    pub media_url: String,

    /// URL prefix of built artifacts (default: `<media_url>bundles/`)
    pub bundles_url: Option<String>,

    /// Host used for external includes and absolute bundle URLs
    pub site_name: Option<String>,

    /// Development mode: per-file includes and the change watcher
    pub debug: bool,

    /// Declaration file name, relative to the project directory
    pub bundles_file: PathBuf,

    pub compress: CompressConfig,
    pub lint: LintConfig,
    pub watch: WatchConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            root: PathBuf::new(),
            media_root: PathBuf::from("media"),
            media_url: "/media/".to_string(),
            bundles_url: None,
            site_name: None,
            debug: false,
            bundles_file: PathBuf::from("bundles.yaml"),
            compress: CompressConfig::default(),
            lint: LintConfig::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl Settings {
    /// Default settings rooted at `root`.
    pub fn for_root(root: &Path) -> Self {
        let mut settings = Self::default();
        settings.finalize(root);
        settings
    }

    /// Load settings for the project at `root`.
    ///
    /// `file` overrides the default `fardel.toml`; a missing default file
    /// yields the defaults, a missing explicit file is an error.
    pub fn load(root: &Path, file: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match file {
            Some(file) if file.is_absolute() => (file.to_path_buf(), true),
            Some(file) => (root.join(file), true),
            None => (root.join(SETTINGS_FILE), false),
        };

        let mut settings = if path.exists() || required {
            Self::from_path(&path)?
        } else {
            Self::default()
        };

        settings.finalize(root);
        settings.validate()?;
        Ok(settings)
    }

    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (settings, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            let display_path = path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_else(|| path.to_string_lossy());
            log!("warning"; "unknown fields in {}, ignoring: {}", display_path, ignored.join(", "));
        }
        Ok(settings)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let settings = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((settings, ignored))
    }

    /// Resolve relative paths against the project directory.
    fn finalize(&mut self, root: &Path) {
        self.root = root.to_path_buf();
        if self.media_root.is_relative() {
            self.media_root = root.join(&self.media_root);
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.media_url.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "media_url `{}` must end with `/`",
                self.media_url
            )));
        }
        if let Some(url) = &self.bundles_url
            && !url.ends_with('/')
        {
            return Err(ConfigError::Validation(format!(
                "bundles_url `{url}` must end with `/`"
            )));
        }
        if self.watch.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.interval_ms must be greater than 0".to_string(),
            ));
        }
        for (tag, command) in &self.compress.commands {
            let Some(program) = command.first() else {
                return Err(ConfigError::Validation(format!(
                    "compress.commands.{tag} is empty"
                )));
            };
            if which::which(program).is_err() {
                log!("warning"; "compress.commands.{}: `{}` not found, {} bundles stay uncompressed", tag, program, tag);
            }
        }
        if let Some(program) = self.lint.command.first()
            && which::which(program).is_err()
        {
            log!("warning"; "lint.command: `{}` not found", program);
        }
        Ok(())
    }

    /// Absolute path of the declaration file.
    pub fn declarations_path(&self) -> PathBuf {
        self.root.join(&self.bundles_file)
    }

    /// Absolute path of a member file.
    pub fn source_path(&self, file: &str) -> PathBuf {
        self.media_root.join(file)
    }

    /// Directory built artifacts are written to.
    pub fn bundles_dir(&self) -> PathBuf {
        self.media_root.join(BUNDLES_DIR)
    }

    /// URL prefix of built artifacts.
    pub fn bundles_url(&self) -> String {
        self.bundles_url
            .clone()
            .unwrap_or_else(|| format!("{}{BUNDLES_DIR}/", self.media_url))
    }
}

/// Parse settings from TOML text, without path resolution.
impl FromStr for Settings {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(dir.path(), None).unwrap();

        assert_eq!(settings.media_root, dir.path().join("media"));
        assert_eq!(settings.bundles_dir(), dir.path().join("media/bundles"));
        assert_eq!(settings.declarations_path(), dir.path().join("bundles.yaml"));
        assert_eq!(settings.bundles_url(), "/media/bundles/");
        assert!(!settings.debug);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"
media_root = "static"
media_url = "/static/"
bundles_url = "https://cdn.example.com/b/"
debug = true

[watch]
interval_ms = 250
"#,
        )
        .unwrap();

        let settings = Settings::load(dir.path(), None).unwrap();
        assert_eq!(settings.media_root, dir.path().join("static"));
        assert_eq!(settings.bundles_url(), "https://cdn.example.com/b/");
        assert!(settings.debug);
        assert_eq!(settings.watch.interval_ms, 250);
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(dir.path(), Some(Path::new("other.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(..)));
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let (settings, ignored) =
            Settings::parse_with_ignored("debug = true\nmedai_root = \"x\"\n").unwrap();
        assert!(settings.debug);
        assert_eq!(ignored, ["medai_root"]);
    }

    #[test]
    fn test_validation() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "media_url = \"/media\"\n").unwrap();
        let err = Settings::load(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        fs::write(dir.path().join(SETTINGS_FILE), "[watch]\ninterval_ms = 0\n").unwrap();
        assert!(Settings::load(dir.path(), None).is_err());

        fs::write(dir.path().join(SETTINGS_FILE), "[compress.commands]\njs = []\n").unwrap();
        assert!(Settings::load(dir.path(), None).is_err());
    }

    #[test]
    fn test_absolute_media_root_kept() {
        let mut settings: Settings = "media_root = \"/srv/media\"\n".parse().unwrap();
        settings.finalize(Path::new("/project"));
        assert_eq!(settings.media_root, PathBuf::from("/srv/media"));
        assert_eq!(settings.source_path("js/a.js"), PathBuf::from("/srv/media/js/a.js"));

        assert!(matches!(
            "media_root = 3".parse::<Settings>(),
            Err(ConfigError::Toml(_))
        ));
    }
}
