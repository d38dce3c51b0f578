//! Build orchestration and the authoritative bundle table.
//!
//! # Full build
//!
//! ```text
//! load table ─► build every bundle (rayon) ─► rereference ─► compress fresh ─► publish
//! ```
//!
//! Rereferencing waits for every build so all fingerprints are on disk.
//! The new table becomes visible only once the whole sequence succeeded;
//! a failed reload keeps serving the previous table.
//!
//! # Concurrency
//!
//! The table lives in an [`ArcSwap`]: readers take lock-free snapshots and
//! always see a complete table. Writers (full builds and targeted rebuilds)
//! are serialized by a mutex, so the watcher and the CLI never interleave.


use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rayon::prelude::*;

use crate::bundle::{Bundle, BundleTable, Registry};
use crate::compress::{CompressOutcome, Compressor, CompressorChain, compress_bundle};
use crate::config::Settings;
use crate::error::Result;
use crate::{debug, log};

/// Summary of one build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Bundles in the loaded table.
    pub total: usize,
    /// Bundles whose artifact was written by this pass.
    pub built: Vec<String>,
    /// Bundles whose artifact already existed.
    pub unchanged: Vec<String>,
    /// Bundles whose artifact had references rewritten.
    pub rewritten: Vec<String>,
    /// Freshly built bundles that were compressed.
    pub compressed: usize,
    /// Requested names that are not declared.
    pub unknown: Vec<String>,
}

/// Owns the bundle table and runs builds against it.
///
/// Construct once per process and share as `Arc<BundleManager>`.
pub struct BundleManager {
    settings: Arc<Settings>,
    registry: Registry,
    compressor: Box<dyn Compressor>,
    table: ArcSwap<BundleTable>,
    writer: Mutex<()>,
}

impl BundleManager {
    /// Manager with the default registry and the configured compressor.
    /// The table is empty until the first build.
    pub fn new(settings: Arc<Settings>) -> Self {
        let compressor = CompressorChain::from_settings(&settings.compress);
        Self::with_parts(settings, Registry::with_defaults(), compressor)
    }

    pub fn with_parts(
        settings: Arc<Settings>,
        registry: Registry,
        compressor: Box<dyn Compressor>,
    ) -> Self {
        Self {
            settings,
            registry,
            compressor,
            table: ArcSwap::from_pointee(BundleTable::new()),
            writer: Mutex::new(()),
        }
    }

    /// Create a manager and run a full build.
    pub fn open(settings: Arc<Settings>) -> Result<Self> {
        let manager = Self::new(settings);
        manager.build_all()?;
        Ok(manager)
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current table. Stays valid (and unchanged) while the manager moves on.
    pub fn snapshot(&self) -> Arc<BundleTable> {
        self.table.load_full()
    }

    /// Look up a bundle in the current table.
    pub fn get(&self, name: &str) -> Result<Arc<Bundle>> {
        self.table.load().lookup(name)
    }

    /// Load the declarations into a fresh, unpublished table.
    pub fn load(&self) -> Result<BundleTable> {
        self.registry.load(&self.settings)
    }

    /// Reload the declarations and run the full build sequence.
    pub fn build_all(&self) -> Result<BuildReport> {
        self.build(None)
    }

    /// Full build sequence, optionally restricted to `only`.
    ///
    /// The whole table is loaded and published either way; `only` limits
    /// which artifacts are built, rereferenced and compressed.
    pub fn build(&self, only: Option<&[String]>) -> Result<BuildReport> {
        let table = self.load()?;
        self.build_table(table, only, &|_| {})
    }

    /// Build sequence over an already loaded table.
    ///
    /// `on_built` runs on a rayon worker after each bundle's build step.
    pub fn build_table(
        &self,
        table: BundleTable,
        only: Option<&[String]>,
        on_built: &(dyn Fn(&Bundle) + Sync),
    ) -> Result<BuildReport> {
        let _writer = self.writer.lock();

        let mut report = BuildReport {
            total: table.len(),
            ..BuildReport::default()
        };
        let targets: Vec<Arc<Bundle>> = match only {
            None => table.iter().cloned().collect(),
            Some(names) => {
                let mut targets = Vec::with_capacity(names.len());
                for name in names {
                    match table.get(name) {
                        Some(bundle) => targets.push(Arc::clone(bundle)),
                        None => report.unknown.push(name.clone()),
                    }
                }
                targets
            }
        };

        let results = targets
            .par_iter()
            .map(|bundle| {
                let fresh = bundle.build()?;
                on_built(bundle);
                Ok(fresh)
            })
            .collect::<Result<Vec<bool>>>()?;

        let mut fresh = Vec::new();
        for (bundle, is_fresh) in targets.iter().zip(results) {
            if is_fresh {
                report.built.push(bundle.name().to_string());
                fresh.push(bundle);
            } else {
                report.unchanged.push(bundle.name().to_string());
            }
        }

        for bundle in &targets {
            if bundle.rereference(&table)? {
                report.rewritten.push(bundle.name().to_string());
            }
        }

        if self.settings.compress.enable {
            report.compressed = fresh
                .par_iter()
                .map(|bundle| compress_bundle(self.compressor.as_ref(), bundle))
                .filter(|outcome| matches!(outcome, CompressOutcome::Compressed { .. }))
                .count();
        }

        self.table.store(Arc::new(table));
        debug!("build"; "published {} bundles", report.total);
        Ok(report)
    }

    /// Recompute one bundle's fingerprint, build it and rereference it.
    ///
    /// Only the rebuilt bundle is rereferenced: artifacts of other bundles
    /// that point at it keep the fingerprint they were rewritten with until
    /// their own sources change. Returns whether a new artifact was written.
    pub fn rebuild(&self, name: &str) -> Result<bool> {
        let _writer = self.writer.lock();

        let current = self.table.load_full();
        let refreshed = current.lookup(name)?.refreshed()?;
        let fresh = refreshed.build()?;

        let table = current.with_bundle(refreshed);
        let bundle = table.lookup(name)?;
        bundle.rereference(&table)?;
        if fresh && self.settings.compress.enable {
            compress_bundle(self.compressor.as_ref(), &bundle);
        }

        if fresh {
            log!("build"; "{} -> {}", name, bundle.output_name());
        }
        self.table.store(Arc::new(table));
        Ok(fresh)
    }
}
