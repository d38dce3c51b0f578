//! Explicit cleanup of superseded artifacts.
//!
//! Builds never delete anything: an artifact stays on disk after its bundle
//! moves to a new fingerprint. [`prune`] removes older fingerprinted
//! siblings, keeping the current artifact plus the newest `keep - 1`
//! others per bundle.

use std::fs;
use std::io;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::bundle::fingerprint::{is_fingerprint, split_extension};
use crate::bundle::{Bundle, BundleTable};
use crate::debug;
use crate::error::{BundleError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<PathBuf>,
    /// Superseded artifacts left in place by the retention count.
    pub retained: usize,
}

/// Remove superseded artifacts of every bundle in `table`.
pub fn prune(table: &BundleTable, keep: NonZeroUsize) -> Result<PruneReport> {
    let mut report = PruneReport::default();
    for bundle in table.iter() {
        prune_bundle(bundle, keep.get() - 1, &mut report)?;
    }
    Ok(report)
}

fn prune_bundle(bundle: &Bundle, keep_others: usize, report: &mut PruneReport) -> Result<()> {
    let current = bundle.artifact_path();
    // Sources changed since the last build: the served artifact is one of
    // the siblings, so nothing here can be called superseded.
    if !current.is_file() {
        debug!("prune"; "{} not built, skipping", bundle.name());
        return Ok(());
    }
    let Some(dir) = current.parent() else {
        return Ok(());
    };
    let stem = bundle.name().rsplit('/').next().unwrap_or(bundle.name());

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(BundleError::io(dir, err)),
    };

    let mut siblings: Vec<(SystemTime, PathBuf)> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(|file| is_sibling(stem, file))
        })
        .map(|entry| entry.path())
        .filter(|path| *path != current)
        .map(|path| {
            let mtime = fs::metadata(&path)
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (mtime, path)
        })
        .collect();

    // Newest first; ties by path for a stable order.
    siblings.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    for (index, (_, path)) in siblings.into_iter().enumerate() {
        if index < keep_others {
            report.retained += 1;
            continue;
        }
        fs::remove_file(&path).map_err(|err| BundleError::io(&path, err))?;
        debug!("prune"; "removed {}", path.display());
        report.removed.push(path);
    }
    Ok(())
}

/// Whether `file` is `stem` with a fingerprint spliced in.
fn is_sibling(stem: &str, file: &str) -> bool {
    match split_extension(stem) {
        Some((base, ext)) => file
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('.'))
            .and_then(|rest| rest.strip_suffix(ext))
            .and_then(|rest| rest.strip_suffix('.'))
            .is_some_and(is_fingerprint),
        None => file
            .strip_prefix(stem)
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(is_fingerprint),
    }
}
