//! Command-line interface module.

mod args;
pub mod build;
pub mod lint;
pub mod list;
pub mod prune;
pub mod watch;

pub use args::{Cli, Commands};

use anyhow::{Context, Result};
use fardel::bundle::{BundleTable, Registry};
use fardel::config::Settings;
use fardel::log;

/// Load settings for the project directory, applying CLI overrides.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = Settings::load(&cli.dir, cli.config.as_deref())
        .with_context(|| format!("Failed to load settings in `{}`", cli.dir.display()))?;

    if let Some(media_root) = &cli.media_root {
        settings.media_root = if media_root.is_absolute() {
            media_root.clone()
        } else {
            cli.dir.join(media_root)
        };
    }
    Ok(settings)
}

/// Load the declared bundles without building anything.
pub fn load_table(settings: &Settings) -> Result<BundleTable> {
    Registry::with_defaults().load(settings).with_context(|| {
        format!(
            "Failed to load bundles from `{}`",
            settings.declarations_path().display()
        )
    })
}

/// Warn about requested names that are not declared.
pub fn warn_unknown<'a>(names: impl IntoIterator<Item = &'a String>) {
    for name in names {
        log!("warning"; "no bundle named `{}`", name);
    }
}
