//! `fardel build`

use std::sync::Arc;

use anyhow::{Context, Result};
use fardel::config::Settings;
use fardel::logger::ProgressLine;
use fardel::manager::{BuildReport, BundleManager};
use fardel::log;
use fardel::utils::plural::plural_count;

use super::warn_unknown;

/// Build every bundle, or only `names`.
pub fn build_bundles(settings: Arc<Settings>, names: &[String]) -> Result<BuildReport> {
    let manager = BundleManager::new(settings);
    let table = super::load_table(manager.settings())?;

    let total = if names.is_empty() {
        table.len()
    } else {
        names.iter().filter(|name| table.contains(name)).count()
    };
    let only = (!names.is_empty()).then_some(names);

    let progress = ProgressLine::new("bundles", total);
    let report = manager
        .build_table(table, only, &|_| progress.inc())
        .context("Build failed")?;
    progress.finish();

    warn_unknown(&report.unknown);
    log!(
        "build";
        "{} built, {} up to date, {} rewritten, {} compressed",
        plural_count(report.built.len(), "bundle"),
        report.unchanged.len(),
        report.rewritten.len(),
        report.compressed
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_build_command() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("media/js")).unwrap();
        fs::write(dir.path().join("media/js/a.js"), "var a;").unwrap();
        fs::write(dir.path().join("bundles.yaml"), "app.js:\n  files: [js/a.js]\n").unwrap();

        let mut settings = Settings::load(dir.path(), None).unwrap();
        settings.compress.enable = false;
        let names = vec!["app.js".to_string(), "nope.js".to_string()];
        let report = build_bundles(Arc::new(settings), &names).unwrap();

        assert_eq!(report.built, ["app.js"]);
        assert_eq!(report.unknown, ["nope.js"]);
    }
}
