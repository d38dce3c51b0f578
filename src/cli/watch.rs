//! `fardel watch`

use std::sync::Arc;
use std::sync::mpsc;

use anyhow::{Context, Result, anyhow};
use fardel::config::Settings;
use fardel::manager::BundleManager;
use fardel::utils::plural::plural_count;
use fardel::log;

/// Build everything, then rebuild on changes until Ctrl+C.
pub fn watch_bundles(mut settings: Settings) -> Result<()> {
    // The watcher only runs in development mode.
    settings.debug = true;
    let manager = Arc::new(BundleManager::new(Arc::new(settings)));

    let report = manager.build_all().context("Initial build failed")?;
    log!(
        "build";
        "{} built, {} up to date",
        plural_count(report.built.len(), "bundle"),
        report.unchanged.len()
    );

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))?;

    let handle = fardel::watch::start(&manager)
        .context("Failed to start watcher")?
        .ok_or_else(|| anyhow!("watcher disabled outside development mode"))?;
    log!(
        "watch";
        "watching {} (Ctrl+C to stop)",
        manager.settings().media_root.display()
    );

    let _ = rx.recv();
    log!("watch"; "shutting down...");
    handle
        .join()
        .map_err(|_| anyhow!("watcher thread panicked"))
}
