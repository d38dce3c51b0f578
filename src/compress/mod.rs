//! Best-effort compression of built artifacts.
//!
//! A [`Compressor`] rewrites an artifact in place, keyed by the bundle's file
//! type tag. Nothing here fails a build: [`compress_bundle`] logs every
//! outcome and the artifact stays servable uncompressed.
//!
//! | Type                   | Behavior                                    |
//! |------------------------|---------------------------------------------|
//! | [`Minifier`]           | oxc (js) and lightningcss (css), in process |
//! | [`ExternalCompressor`] | `[compress.commands]` per type tag          |
//! | [`CompressorChain`]    | external command if configured, else minify |
//! | [`NoCompression`]      | compression disabled                        |

mod external;
mod minify;

pub use external::ExternalCompressor;
pub use minify::{Minifier, minify_css, minify_js};

use std::path::Path;

use crate::bundle::Bundle;
use crate::config::CompressConfig;
use crate::{debug, log};

/// Result of compressing one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressOutcome {
    /// Artifact replaced; sizes in bytes.
    Compressed { before: u64, after: u64 },
    /// No compressor for this file type.
    Skipped,
    /// The configured tool is not installed.
    Unavailable(String),
    /// The tool ran but its result was discarded.
    Failed(String),
}

/// Compress an artifact in place.
pub trait Compressor: Send + Sync {
    /// Compress `artifact`, a file of type `file_type` (`js`, `css`, ...).
    ///
    /// `Err` is reserved for IO and process failures; the artifact is left
    /// untouched whenever the outcome is not `Compressed`.
    fn compress(&self, artifact: &Path, file_type: &str) -> anyhow::Result<CompressOutcome>;

    /// Short name for log messages.
    fn name(&self) -> &str;
}

/// Compressor used when `[compress] enable = false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCompression;

impl Compressor for NoCompression {
    fn compress(&self, _: &Path, _: &str) -> anyhow::Result<CompressOutcome> {
        Ok(CompressOutcome::Skipped)
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// External command where one is configured for the type, minifier otherwise.
#[derive(Debug, Clone, Default)]
pub struct CompressorChain {
    external: ExternalCompressor,
    minifier: Minifier,
}

impl CompressorChain {
    pub fn new(external: ExternalCompressor) -> Self {
        Self {
            external,
            minifier: Minifier,
        }
    }

    /// Compressor for the `[compress]` section.
    pub fn from_settings(config: &CompressConfig) -> Box<dyn Compressor> {
        if config.enable {
            Box::new(Self::new(ExternalCompressor::new(config.commands.clone())))
        } else {
            Box::new(NoCompression)
        }
    }
}

impl Compressor for CompressorChain {
    fn compress(&self, artifact: &Path, file_type: &str) -> anyhow::Result<CompressOutcome> {
        if self.external.handles(file_type) {
            self.external.compress(artifact, file_type)
        } else {
            self.minifier.compress(artifact, file_type)
        }
    }

    fn name(&self) -> &str {
        "chain"
    }
}

/// Compress a built bundle, logging the outcome. Never fails.
pub fn compress_bundle(compressor: &dyn Compressor, bundle: &Bundle) -> CompressOutcome {
    let file_type = bundle.kind().file_type();
    let outcome = match compressor.compress(&bundle.artifact_path(), file_type) {
        Ok(outcome) => outcome,
        Err(err) => CompressOutcome::Failed(format!("{err:#}")),
    };

    match &outcome {
        CompressOutcome::Compressed { before, after } => {
            log!("compress"; "{} ({} -> {})", bundle.output_name(), format_size(*before), format_size(*after));
        }
        CompressOutcome::Skipped => {
            debug!("compress"; "{} skipped ({})", bundle.name(), file_type);
        }
        CompressOutcome::Unavailable(reason) => {
            log!("warning"; "{} left uncompressed: {}", bundle.name(), reason);
        }
        CompressOutcome::Failed(reason) => {
            log!("warning"; "compressing {} failed: {}", bundle.name(), reason);
        }
    }
    outcome
}

/// `812 B`, `3.4 KB`, `1.2 MB`
fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let size = bytes as f64;
    if size < KB {
        format!("{bytes} B")
    } else if size < KB * KB {
        format!("{:.1} KB", size / KB)
    } else {
        format!("{:.1} MB", size / (KB * KB))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{BundleDescriptor, BundleKind};
    use crate::testing::Fixture;
    use std::fs;

    struct Exploding;

    impl Compressor for Exploding {
        fn compress(&self, _: &Path, _: &str) -> anyhow::Result<CompressOutcome> {
            anyhow::bail!("boom")
        }

        fn name(&self) -> &str {
            "exploding"
        }
    }

    fn built_script(fx: &Fixture) -> Bundle {
        fx.source("a.js", "var  answer = 42 ;\n");
        let bundle = Bundle::new(
            BundleDescriptor::simple("app.js", &["a.js"]),
            BundleKind::Script,
            fx.media(),
        )
        .unwrap();
        bundle.build().unwrap();
        bundle
    }

    #[test]
    fn test_chain_falls_back_to_minifier() {
        let fx = Fixture::new();
        let bundle = built_script(&fx);
        let before = fs::read_to_string(bundle.artifact_path()).unwrap();

        let chain = CompressorChain::default();
        let outcome = compress_bundle(&chain, &bundle);
        assert!(matches!(outcome, CompressOutcome::Compressed { .. }));
        let after = fs::read_to_string(bundle.artifact_path()).unwrap();
        assert!(after.len() < before.len());
    }

    #[test]
    fn test_errors_become_outcomes() {
        let fx = Fixture::new();
        let bundle = built_script(&fx);

        let outcome = compress_bundle(&Exploding, &bundle);
        assert_eq!(outcome, CompressOutcome::Failed("boom".into()));
        assert!(bundle.is_built());
    }

    #[test]
    fn test_disabled() {
        let config = CompressConfig {
            enable: false,
            ..CompressConfig::default()
        };
        let compressor = CompressorChain::from_settings(&config);
        assert_eq!(compressor.name(), "none");
        assert_eq!(
            compressor.compress(Path::new("a.js"), "js").unwrap(),
            CompressOutcome::Skipped
        );
        assert_eq!(
            CompressorChain::from_settings(&CompressConfig::default()).name(),
            "chain"
        );
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(812), "812 B");
        assert_eq!(format_size(3 * 1024 + 512), "3.5 KB");
        assert_eq!(format_size(2 * 1024 * 1024), "2.0 MB");
    }
}
