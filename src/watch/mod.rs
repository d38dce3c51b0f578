//! Polling change watcher for development mode.
//!
//! One background thread stats every tracked member file and the
//! declaration file once per interval:
//!
//! - a member whose mtime changed triggers [`BundleManager::rebuild`] of
//!   every bundle listing it (each bundle once per tick, sequentially)
//! - a changed declaration file triggers a full build, after which the
//!   tracked file set is re-derived from the new table
//!
//! Files that cannot be stat'ed are skipped for that tick and stay tracked.
//! Errors are reported on the watch status line and never end the loop.


use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use rustc_hash::FxHashMap;

use crate::debug;
use crate::logger::{status_error, status_success};
use crate::manager::BundleManager;
use crate::utils::fs::get_mtime;
use crate::utils::plural::plural_count;

/// What one polling pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Bundles rebuilt because a member changed.
    pub rebuilt: Vec<String>,
    /// Bundles whose rebuild failed, with the error message.
    pub failed: Vec<(String, String)>,
    /// Whether the declarations were reloaded.
    pub reloaded: bool,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.rebuilt.is_empty() && self.failed.is_empty() && !self.reloaded
    }
}

/// Watcher state. Owned by the watcher thread only.
pub struct ChangeWatcher {
    manager: Arc<BundleManager>,
    interval: Duration,
    /// Absolute member path → last observed mtime (`None`: unreadable so far).
    mtimes: FxHashMap<PathBuf, Option<SystemTime>>,
    /// Absolute member path → path relative to the media root.
    files: FxHashMap<PathBuf, String>,
    config_path: PathBuf,
    config_mtime: Option<SystemTime>,
}

impl ChangeWatcher {
    /// Watcher over the manager's current table.
    pub fn new(manager: Arc<BundleManager>) -> Self {
        let settings = manager.settings();
        let mut watcher = Self {
            interval: settings.watch.interval(),
            config_path: settings.declarations_path(),
            manager,
            mtimes: FxHashMap::default(),
            files: FxHashMap::default(),
            config_mtime: None,
        };
        watcher.track();
        watcher
    }

    /// Re-derive the tracked set from the current table, recording fresh
    /// modification times.
    pub fn track(&mut self) {
        self.retrack(&FxHashMap::default(), None);
    }

    /// Re-derive the tracked set after a reload that began at `started`.
    ///
    /// Files tracked before the reload keep the mtime read before it
    /// (`before`), so an edit made while the build ran still counts as a
    /// change. New files modified after `started` are recorded as unseen.
    fn retrack(
        &mut self,
        before: &FxHashMap<PathBuf, Option<SystemTime>>,
        started: Option<SystemTime>,
    ) {
        let table = self.manager.snapshot();
        self.mtimes.clear();
        self.files.clear();

        for bundle in table.iter() {
            for file in bundle.files() {
                let path = bundle.source_path(file);
                let seen = match before.get(&path) {
                    Some(seen) => *seen,
                    None => get_mtime(&path)
                        .filter(|mtime| started.is_none_or(|started| *mtime < started)),
                };
                self.mtimes.insert(path.clone(), seen);
                self.files.insert(path, file.clone());
            }
        }
        if started.is_none() {
            self.config_mtime = get_mtime(&self.config_path);
        }
        debug!("watch"; "tracking {}", plural_count(self.mtimes.len(), "file"));
    }

    pub fn tracked(&self) -> usize {
        self.mtimes.len()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One polling pass.
    pub fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();

        let changed = self.changed_files();
        if !changed.is_empty() {
            let table = self.manager.snapshot();
            let mut names: Vec<String> = Vec::new();
            for file in &changed {
                for bundle in table.containing(file) {
                    if !names.iter().any(|n| n == bundle.name()) {
                        names.push(bundle.name().to_string());
                    }
                }
            }

            for name in names {
                match self.manager.rebuild(&name) {
                    Ok(_) => {
                        status_success(&format!("rebuilt {name}"));
                        report.rebuilt.push(name);
                    }
                    Err(err) => {
                        let detail = error_chain(&err);
                        status_error(&format!("rebuild failed: {name}"), &detail);
                        report.failed.push((name, detail));
                    }
                }
            }
        }

        if let Some(mtime) = get_mtime(&self.config_path)
            && self.config_mtime != Some(mtime)
        {
            self.config_mtime = Some(mtime);
            let before: FxHashMap<PathBuf, Option<SystemTime>> = self
                .mtimes
                .keys()
                .map(|path| (path.clone(), get_mtime(path)))
                .collect();
            let started = SystemTime::now();
            match self.manager.build_all() {
                Ok(build) => {
                    self.retrack(&before, Some(started));
                    status_success(&format!(
                        "reloaded {}",
                        plural_count(build.total, "bundle")
                    ));
                    report.reloaded = true;
                }
                Err(err) => {
                    let detail = error_chain(&err);
                    status_error("reload failed, keeping previous bundles", &detail);
                }
            }
        }

        report
    }

    /// Members whose mtime moved since the last pass, relative to the media root.
    fn changed_files(&mut self) -> Vec<String> {
        let mut changed = Vec::new();
        for (path, seen) in &mut self.mtimes {
            let Some(now) = get_mtime(path) else {
                continue;
            };
            if *seen != Some(now) {
                *seen = Some(now);
                if let Some(file) = self.files.get(path) {
                    changed.push(file.clone());
                }
            }
        }
        changed.sort_unstable();
        changed
    }

    /// Poll until `shutdown` is set.
    pub fn run(mut self, shutdown: &AtomicBool) {
        while !shutdown.load(Ordering::Relaxed) {
            self.tick();
            thread::sleep(self.interval);
        }
    }

    /// Run on a dedicated thread.
    pub fn spawn(self) -> io::Result<WatchHandle> {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        let thread = thread::Builder::new()
            .name("fardel-watch".into())
            .spawn(move || self.run(&flag))?;
        Ok(WatchHandle { shutdown, thread })
    }
}

/// Start the watcher if the manager runs in development mode.
pub fn start(manager: &Arc<BundleManager>) -> io::Result<Option<WatchHandle>> {
    if !manager.settings().debug {
        return Ok(None);
    }
    ChangeWatcher::new(Arc::clone(manager)).spawn().map(Some)
}

/// Handle to a spawned watcher thread.
pub struct WatchHandle {
    shutdown: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl WatchHandle {
    /// Ask the loop to stop after its current pass.
    pub fn stop(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Stop and wait for the thread to finish.
    pub fn join(self) -> thread::Result<()> {
        self.stop();
        self.thread.join()
    }
}

/// `error: source: source` on one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
