//! `fardel prune`

use std::num::NonZeroUsize;

use anyhow::{Context, Result};
use fardel::config::Settings;
use fardel::prune::{PruneReport, prune};
use fardel::utils::plural::plural_count;
use fardel::log;

use super::load_table;

/// Remove superseded artifacts, keeping `keep` per bundle.
pub fn prune_artifacts(settings: &Settings, keep: NonZeroUsize) -> Result<PruneReport> {
    let table = load_table(settings)?;
    let report = prune(&table, keep).context("Failed to prune artifacts")?;

    log!(
        "prune";
        "removed {}, kept {} older",
        plural_count(report.removed.len(), "artifact"),
        report.retained
    );
    Ok(report)
}
