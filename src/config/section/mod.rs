//! `fardel.toml` section definitions.
//!
//! | Section      | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | `[compress]` | Minification switch and external commands     |
//! | `[lint]`     | External lint command                          |
//! | `[watch]`    | Change watcher polling interval                |

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// `[compress]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressConfig {
    /// Compress freshly built bundles.
    pub enable: bool,

    /// External commands keyed by file type tag (`js`, `css`, ...).
    ///
    /// Arguments may use `{input}` and `{output}` placeholders:
    ///
    /// ```toml
    /// [compress.commands]
    /// js = ["terser", "{input}", "-c", "-o", "{output}"]
    /// ```
    pub commands: BTreeMap<String, Vec<String>>,
}

impl Default for CompressConfig {
    fn default() -> Self {
        Self {
            enable: true,
            commands: BTreeMap::new(),
        }
    }
}

/// `[lint]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LintConfig {
    /// External lint command; the file path is appended.
    /// Empty means the built-in syntax check.
    pub command: Vec<String>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Polling interval in milliseconds.
    pub interval_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_ms: 1000 }
    }
}

impl WatchConfig {
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_defaults() {
        let compress = CompressConfig::default();
        assert!(compress.enable);
        assert!(compress.commands.is_empty());

        assert!(LintConfig::default().command.is_empty());
        assert_eq!(WatchConfig::default().interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_compress_commands_parse() {
        let config: CompressConfig = toml::from_str(
            r#"
            enable = false
            [commands]
            css = ["csso", "{input}", "-o", "{output}"]
            "#,
        )
        .unwrap();
        assert!(!config.enable);
        assert_eq!(config.commands["css"][0], "csso");
    }
}
